//! Quote Garden client.
//!
//! Answers with `{"statusCode": 200, "data": {"quoteText": ..., "quoteAuthor": ...}}`.

use async_trait::async_trait;
use musing_core::{Error, Quote, Result};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::http::{self, HttpConfig};
use crate::QuoteSource;

pub const DEFAULT_BASE_URL: &str = "https://quote-garden.herokuapp.com/api/v3";

pub const SOURCE_NAME: &str = "Quote Garden";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomResponse {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    data: Option<RawQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    #[serde(default)]
    quote_text: String,
    #[serde(default)]
    quote_author: String,
}

/// Quote Garden API client.
#[derive(Clone)]
pub struct QuoteGardenClient {
    http: reqwest::Client,
    random_url: Url,
}

impl QuoteGardenClient {
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, &HttpConfig::default())
    }

    pub fn with_config(base_url: &str, config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            http: config.build_client()?,
            random_url: http::endpoint(base_url, "quotes/random")?,
        })
    }

    pub async fn fetch_random(&self) -> Result<Quote> {
        debug!("Fetching from Quote Garden...");
        let body = http::get_bytes(&self.http, &self.random_url).await?;
        let quote = parse_response(&body)?;
        info!("Quote Garden returned a quote by {}", quote.author);
        Ok(quote)
    }
}

#[async_trait]
impl QuoteSource for QuoteGardenClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self) -> Result<Quote> {
        self.fetch_random().await
    }
}

/// Parse a Quote Garden body. The provider wraps some quotes in literal
/// quotation marks; those are stripped.
pub fn parse_response(body: &[u8]) -> Result<Quote> {
    let response: RandomResponse = serde_json::from_slice(body).map_err(|e| Error::Parse {
        provider: SOURCE_NAME.to_string(),
        message: e.to_string(),
    })?;

    let raw = match (response.status_code, response.data) {
        (Some(200), Some(raw)) => raw,
        _ => return Err(Error::EmptyPayload(SOURCE_NAME.to_string())),
    };

    let text: String = raw
        .quote_text
        .chars()
        .filter(|c| !matches!(c, '"' | '\u{201c}' | '\u{201d}'))
        .collect();

    if text.trim().is_empty() {
        return Err(Error::EmptyPayload(SOURCE_NAME.to_string()));
    }

    Ok(Quote::new(text.trim(), raw.quote_author.trim()).with_source(SOURCE_NAME))
}

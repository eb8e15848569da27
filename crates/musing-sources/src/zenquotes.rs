//! ZenQuotes client: random quote and quote of the day.
//!
//! Both endpoints answer with a one-element array, `[{"q": ..., "a": ...}]`.

use async_trait::async_trait;
use musing_core::{Error, Quote, Result};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::http::{self, HttpConfig};
use crate::patterns::is_error_response;
use crate::{DailyQuoteSource, QuoteSource};

pub const DEFAULT_BASE_URL: &str = "https://zenquotes.io/api";

/// Source tag for random quotes.
pub const SOURCE_NAME: &str = "ZenQuotes";
/// Source tag for the quote of the day.
pub const TODAY_SOURCE_NAME: &str = "ZenQuotes (Today)";

/// Longest excerpt of an error notice kept in the error message.
const EXCERPT_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    a: Option<String>,
}

/// ZenQuotes API client.
#[derive(Clone)]
pub struct ZenQuotesClient {
    http: reqwest::Client,
    random_url: Url,
    today_url: Url,
}

impl ZenQuotesClient {
    /// Create a client for the public ZenQuotes API.
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, &HttpConfig::default())
    }

    /// Create a client against a custom base URL.
    pub fn with_config(base_url: &str, config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            http: config.build_client()?,
            random_url: http::endpoint(base_url, "random")?,
            today_url: http::endpoint(base_url, "today")?,
        })
    }

    pub async fn fetch_random(&self) -> Result<Quote> {
        debug!("Fetching from ZenQuotes...");
        let body = http::get_bytes(&self.http, &self.random_url).await?;
        let quote = parse_response(&body, SOURCE_NAME)?;
        info!("ZenQuotes returned a quote by {}", quote.author);
        Ok(quote)
    }
}

#[async_trait]
impl QuoteSource for ZenQuotesClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self) -> Result<Quote> {
        self.fetch_random().await
    }
}

#[async_trait]
impl DailyQuoteSource for ZenQuotesClient {
    fn name(&self) -> &str {
        TODAY_SOURCE_NAME
    }

    async fn fetch_today(&self) -> Result<Quote> {
        debug!("Fetching today's quote from ZenQuotes...");
        let body = http::get_bytes(&self.http, &self.today_url).await?;
        let quote = parse_response(&body, TODAY_SOURCE_NAME)?;
        info!("ZenQuotes quote of the day is by {}", quote.author);
        Ok(quote)
    }
}

/// Parse a ZenQuotes body and tag the quote with `source`.
///
/// Fails on malformed JSON, an empty array, a blank quote, or an error
/// notice disguised as a quote.
pub fn parse_response(body: &[u8], source: &str) -> Result<Quote> {
    let raw: Vec<RawQuote> = serde_json::from_slice(body).map_err(|e| Error::Parse {
        provider: source.to_string(),
        message: e.to_string(),
    })?;

    let first = raw
        .into_iter()
        .next()
        .ok_or_else(|| Error::EmptyPayload(source.to_string()))?;

    let text = first.q.unwrap_or_default();
    let author = first.a.unwrap_or_default();

    if is_error_response(&text, &author) {
        return Err(Error::ErrorPayload {
            provider: source.to_string(),
            excerpt: text.chars().take(EXCERPT_CHARS).collect(),
        });
    }

    if text.trim().is_empty() {
        return Err(Error::EmptyPayload(source.to_string()));
    }

    Ok(Quote::new(text.trim(), author.trim()).with_source(source))
}

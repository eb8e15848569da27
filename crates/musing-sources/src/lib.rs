//! # musing-sources
//!
//! Upstream quote providers for Musing.
//!
//! Each provider is wrapped in a [`QuoteSource`] adapter that either yields a
//! well-formed [`Quote`] tagged with the provider name or fails. Callers decide
//! what to do on failure; the built-in list in [`fallback`] never fails.

pub mod fallback;
pub mod http;
pub mod patterns;
pub mod quote_garden;
pub mod zenquotes;

use async_trait::async_trait;
use musing_core::{Quote, Result};

pub use fallback::{random_fallback, FALLBACK_QUOTES};
pub use http::HttpConfig;
pub use patterns::{is_error_response, ERROR_PATTERNS};
pub use quote_garden::QuoteGardenClient;
pub use zenquotes::ZenQuotesClient;

/// A provider of random quotes.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Provider name, also used as the quote's `source` tag.
    fn name(&self) -> &str;

    /// Fetch one quote.
    async fn fetch(&self) -> Result<Quote>;
}

/// A provider with a "quote of the day" endpoint.
#[async_trait]
pub trait DailyQuoteSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_today(&self) -> Result<Quote>;
}

//! Quote value types.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A quote shown to the user.
///
/// Equality is by content: two quotes with the same text, author and source
/// are the same quote regardless of where they were fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Quote {
    /// Quote body.
    pub text: String,
    /// Attributed author.
    pub author: String,
    /// Provider that produced the quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            source: None,
        }
    }

    /// Tag the quote with the provider it came from.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or("Unknown")
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{201c}{}\u{201d} \u{2014} {}", self.text, self.author)
    }
}

/// A quote together with the time it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedQuote {
    #[serde(flatten)]
    pub quote: Quote,
    /// Fetch time, stored as Unix milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl CachedQuote {
    pub const fn new(quote: Quote, timestamp: DateTime<Utc>) -> Self {
        Self { quote, timestamp }
    }

    /// Time elapsed since the quote was fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// Whether the quote is still inside `window` at time `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) < window
    }

    pub fn into_quote(self) -> Quote {
        self.quote
    }
}

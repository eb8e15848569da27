//! Detection of error notices that a provider returns as if they were quotes.
//!
//! ZenQuotes answers rate-limited requests with HTTP 200 and a body shaped
//! like a normal quote, e.g. `q: "Too many requests. Obtain an auth key..."`,
//! `a: "ZenQuotes.io"`. This list is matched against that shape. If the
//! provider changes its wording, detection silently stops working.

/// Lowercase substrings that mark a quote as an error notice.
pub const ERROR_PATTERNS: [&str; 6] = [
    "too many requests",
    "rate limit",
    "auth key",
    "unlimited access",
    "api error",
    "zenquotes.io",
];

/// Whether `text` and `author` together look like a provider error notice.
pub fn is_error_response(text: &str, author: &str) -> bool {
    let combined = format!("{text} {author}").to_lowercase();
    ERROR_PATTERNS
        .iter()
        .any(|pattern| combined.contains(pattern))
}

//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use musing_core::{Error, HttpError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::debug;
use url::Url;

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("Musing/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every provider client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest` client from this configuration.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))
    }
}

/// Parse `base` and resolve `path` beneath it.
///
/// `base` is treated as a directory even without a trailing slash, so
/// `https://zenquotes.io/api` + `random` gives `https://zenquotes.io/api/random`.
pub fn endpoint(base: &str, path: &str) -> Result<Url> {
    let mut base = Url::parse(base).map_err(|e| HttpError::InvalidUrl(format!("{base}: {e}")))?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
        .map_err(|e| Error::Http(HttpError::InvalidUrl(format!("{path}: {e}"))))
}

/// GET `url` and return the body of a successful response.
pub async fn get_bytes(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    debug!("Requesting: {url}");

    let response = client.get(url.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            Error::Http(HttpError::Timeout)
        } else if e.is_connect() {
            Error::Http(HttpError::ConnectionFailed(e.to_string()))
        } else {
            Error::Network(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Http(HttpError::StatusError {
            status: status.as_u16(),
            message,
        }));
    }

    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| Error::Network(format!("Failed to read response body: {e}")))
}

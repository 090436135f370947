//! tier::http
//!
//! HTTP tier implementation.
//!
//! # Design
//!
//! Both the API and the backend speak plain HTTP: `GET` returns a document,
//! `PUT` stores one. One implementation serves both tiers; only the base URL
//! and credentials differ.
//!
//! Bodies are passed through untouched as raw bytes, so no whitespace or
//! encoding normalization can hide a difference from the round-trip check.
//!
//! Each path segment is percent-encoded on its own, so a name containing
//! `#`, `?` or `%` still addresses its own node.
//!
//! # Status Mapping
//!
//! - `2xx` → success
//! - `401` / `403` → `TierError::AuthFailed`
//! - `404` → `TierError::NotFound`
//! - anything else → `TierError::Rejected`
//! - send failures and timeouts → `TierError::Transport`
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use tiercheck::core::types::{TierKind, TreePath};
//! use tiercheck::tier::{HttpTier, Tier};
//!
//! let backend = HttpTier::new(TierKind::Backend, "http://localhost:5352")?
//!     .with_timeout(Duration::from_secs(30));
//! let listing = backend.get(&TreePath::new("/source")?).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::traits::{Tier, TierError};
use crate::core::config::{Credentials, TierSettings};
use crate::core::types::{TierKind, TreePath};

/// User-Agent header value for tier requests.
const USER_AGENT_VALUE: &str = concat!("tiercheck/", env!("CARGO_PKG_VERSION"));

/// Longest error body carried into a `TierError`.
const MAX_ERROR_BODY: usize = 512;

/// HTTP tier implementation.
pub struct HttpTier {
    /// HTTP client for making requests
    client: Client,
    /// Which tier this endpoint serves
    kind: TierKind,
    /// Base URL, without trailing slash
    base_url: String,
    /// Parsed base URL that request paths are appended to
    base: url::Url,
    /// Optional HTTP basic credentials
    credentials: Option<Credentials>,
    /// Per-request timeout
    timeout: Option<Duration>,
}

// Custom Debug to avoid exposing credentials
impl std::fmt::Debug for HttpTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTier")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTier {
    /// Create a tier client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `TierError::Transport` if the base URL is not http(s).
    pub fn new(kind: TierKind, base_url: impl Into<String>) -> Result<Self, TierError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = url::Url::parse(&base_url)
            .map_err(|e| TierError::Transport(format!("invalid base URL '{}': {}", base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(TierError::Transport(format!(
                "unsupported scheme in base URL '{}'",
                base_url
            )));
        }

        Ok(Self {
            client: Client::new(),
            kind,
            base_url,
            base,
            credentials: None,
            timeout: None,
        })
    }

    /// Create a tier client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `TierError::Transport` if the configured URL is unusable.
    pub fn from_settings(settings: &TierSettings) -> Result<Self, TierError> {
        let mut tier = Self::new(settings.kind, settings.url.as_str())?;
        tier.credentials = settings.credentials.clone();
        tier.timeout = settings.timeout;
        Ok(tier)
    }

    /// Use HTTP basic authentication.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Apply a timeout to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a tree path, encoding each segment.
    fn url(&self, path: &TreePath) -> Result<url::Url, TierError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TierError::Transport(format!("base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(path.as_str().split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    /// Attach the common headers, auth and timeout.
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.header(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    /// Send a request, mapping failures to `TierError::Transport`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, TierError> {
        self.prepare(request).send().await.map_err(|e| {
            if e.is_timeout() {
                TierError::Transport(format!("{} tier timed out: {}", self.kind, e))
            } else {
                TierError::Transport(e.to_string())
            }
        })
    }

    /// Map a non-success response to an error.
    async fn error_for(path: &TreePath, response: Response) -> TierError {
        let status = response.status();
        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => truncate(body.trim(), MAX_ERROR_BODY),
            _ => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        match status {
            StatusCode::NOT_FOUND => TierError::NotFound(path.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TierError::AuthFailed(message),
            _ => TierError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl Tier for HttpTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn get(&self, path: &TreePath) -> Result<Vec<u8>, TierError> {
        let url = self.url(path)?;
        debug!(tier = %self.kind, %url, "GET");

        let response = self.send(self.client.get(url.clone())).await?;
        if !response.status().is_success() {
            return Err(Self::error_for(path, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TierError::Transport(format!("reading body of {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }

    async fn put(&self, path: &TreePath, body: &[u8]) -> Result<(), TierError> {
        let url = self.url(path)?;
        debug!(tier = %self.kind, %url, bytes = body.len(), "PUT");

        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .body(body.to_vec());
        let response = self.send(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(path, response).await)
        }
    }
}

/// Cut `text` to at most `max` bytes on a char boundary.
fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

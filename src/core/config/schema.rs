//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! root = "/source"
//! concurrency = 4
//! flag_duplicates = false
//!
//! [api]
//! url = "https://api.example.org"
//! username = "king"
//! timeout_secs = 30
//!
//! [backend]
//! url = "http://backend.example.org:5352"
//! ```
//!
//! # Validation
//!
//! Config values are validated after parsing: URLs must be http(s), the
//! root must be an absolute tree path, and concurrency must be at least 1.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::TreePath;

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Root of the source tree (default: "/source")
    pub root: Option<String>,

    /// Packages verified concurrently within one project (default: 1)
    pub concurrency: Option<usize>,

    /// Report duplicate listing entries instead of collapsing them
    pub flag_duplicates: Option<bool>,

    /// Front-end API endpoint
    pub api: Option<TierConfig>,

    /// Backend storage endpoint
    pub backend: Option<TierConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.root {
            TreePath::new(root.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("root: {}", e)))?;
        }

        if self.concurrency == Some(0) {
            return Err(ConfigError::InvalidValue(
                "concurrency must be at least 1".into(),
            ));
        }

        if let Some(api) = &self.api {
            api.validate("api")?;
        }
        if let Some(backend) = &self.backend {
            backend.validate("backend")?;
        }

        Ok(())
    }
}

/// Connection settings for one tier.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TierConfig {
    /// Base URL requests are issued against
    pub url: Option<String>,

    /// HTTP basic auth user
    pub username: Option<String>,

    /// HTTP basic auth password
    pub password: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

// Custom Debug to avoid exposing password
impl std::fmt::Debug for TierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TierConfig {
    /// Validate the tier settings. `section` names the table in errors.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            parse_base_url(url)
                .map_err(|msg| ConfigError::InvalidValue(format!("{}.url: {}", section, msg)))?;
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(format!(
                "{}.timeout_secs must be at least 1",
                section
            )));
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "{}.password is set without {}.username",
                section, section
            )));
        }

        Ok(())
    }

    /// Copy with the password replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| "********".to_string()),
            ..self.clone()
        }
    }
}

/// Parse and check a tier base URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<url::Url, String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("'{}': {}", raw, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!("unsupported scheme '{}' in '{}'", other, raw)),
    }
}

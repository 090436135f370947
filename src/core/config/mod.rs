//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Password environment variables
//! 4. CLI flags (applied through [`Overrides`])
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit `--config` path
//! 2. `$TIERCHECK_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/tiercheck/config.toml`
//! 4. `~/.tiercheck/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use tiercheck::core::config::Config;
//! use tiercheck::core::types::TierKind;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//!
//! println!("Root: {}", config.root().unwrap());
//! println!("API: {}", config.tier(TierKind::Api).unwrap().url);
//! ```

pub mod schema;

pub use schema::{FileConfig, TierConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{TierKind, TreePath};

/// Default root of the source tree.
pub const DEFAULT_ROOT: &str = "/source";

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TIERCHECK_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing config value: {0}")]
    Missing(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// HTTP basic credentials for a tier.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

// Custom Debug to avoid exposing password
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

/// Fully resolved connection settings for one tier.
#[derive(Debug, Clone)]
pub struct TierSettings {
    pub kind: TierKind,
    pub url: url::Url,
    pub credentials: Option<Credentials>,
    pub timeout: Option<Duration>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub backend_url: Option<String>,
    pub root: Option<String>,
    pub concurrency: Option<usize>,
    pub flag_duplicates: bool,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File configuration with CLI overrides applied
    pub file: FileConfig,
    /// Path to the config file (if loaded)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the standard locations are
    /// searched and a missing file falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::locate(),
        };

        let (file, loaded_from) = match path {
            Some(path) => {
                let file = Self::read_config(&path)?;
                (file, Some(path))
            }
            None => (FileConfig::default(), None),
        };

        file.validate()?;

        if let Some(path) = &loaded_from {
            for (section, tier) in [("api", &file.api), ("backend", &file.backend)] {
                if tier.as_ref().is_some_and(|t| t.password.is_some()) {
                    warnings.push(ConfigWarning {
                        message: format!(
                            "{}.password is stored in plain text; prefer ${}",
                            section,
                            password_env(section)
                        ),
                        path: path.clone(),
                    });
                }
            }
        }

        Ok(ConfigLoadResult {
            config: Config { file, loaded_from },
            warnings,
        })
    }

    /// Build a config from TOML text without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or validated.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(Config {
            file,
            loaded_from: None,
        })
    }

    /// Find the first existing config file in the standard locations.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("tiercheck/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::home_dir()?.join(".tiercheck/config.toml");
        path.exists().then_some(path)
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply command-line overrides and re-validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an override is invalid.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(url) = &overrides.api_url {
            self.file.api.get_or_insert_with(TierConfig::default).url = Some(url.clone());
        }
        if let Some(url) = &overrides.backend_url {
            self.file.backend.get_or_insert_with(TierConfig::default).url = Some(url.clone());
        }
        if let Some(root) = &overrides.root {
            self.file.root = Some(root.clone());
        }
        if let Some(concurrency) = overrides.concurrency {
            self.file.concurrency = Some(concurrency);
        }
        if overrides.flag_duplicates {
            self.file.flag_duplicates = Some(true);
        }
        self.file.validate()
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Resolved settings for `kind`, reading passwords from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no URL is configured for the tier.
    pub fn tier(&self, kind: TierKind) -> Result<TierSettings, ConfigError> {
        self.tier_with_env(kind, |name| std::env::var(name).ok())
    }

    /// Like [`Config::tier`] with an injected environment lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no URL is configured for the tier.
    pub fn tier_with_env(
        &self,
        kind: TierKind,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<TierSettings, ConfigError> {
        let section = kind.to_string();
        let tier = match kind {
            TierKind::Api => self.file.api.as_ref(),
            TierKind::Backend => self.file.backend.as_ref(),
        };

        let raw_url = tier
            .and_then(|t| t.url.as_deref())
            .ok_or_else(|| ConfigError::Missing(format!("{}.url", section)))?;
        let url = schema::parse_base_url(raw_url)
            .map_err(|msg| ConfigError::InvalidValue(format!("{}.url: {}", section, msg)))?;

        let credentials = tier.and_then(|t| t.username.clone()).map(|username| {
            let password = env(&password_env(&section))
                .or_else(|| tier.and_then(|t| t.password.clone()));
            Credentials { username, password }
        });

        Ok(TierSettings {
            kind,
            url,
            credentials,
            timeout: tier
                .and_then(|t| t.timeout_secs)
                .map(Duration::from_secs),
        })
    }

    /// Get the tree root.
    ///
    /// Defaults to "/source" if not configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the root is not a tree path.
    pub fn root(&self) -> Result<TreePath, ConfigError> {
        let raw = self.file.root.as_deref().unwrap_or(DEFAULT_ROOT);
        TreePath::new(raw).map_err(|e| ConfigError::InvalidValue(format!("root: {}", e)))
    }

    /// Get the package concurrency.
    ///
    /// Defaults to 1 (sequential) if not configured.
    pub fn concurrency(&self) -> usize {
        self.file.concurrency.unwrap_or(1).max(1)
    }

    /// Check if duplicate listing entries are reported.
    ///
    /// Defaults to `false` if not configured.
    pub fn flag_duplicates(&self) -> bool {
        self.file.flag_duplicates.unwrap_or(false)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    /// The effective configuration with passwords redacted.
    pub fn redacted(&self) -> FileConfig {
        FileConfig {
            api: self.file.api.as_ref().map(TierConfig::redacted),
            backend: self.file.backend.as_ref().map(TierConfig::redacted),
            ..self.file.clone()
        }
    }
}

/// Environment variable holding the password for a tier section.
fn password_env(section: &str) -> String {
    format!("TIERCHECK_{}_PASSWORD", section.to_uppercase())
}

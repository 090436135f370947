//! tier::factory
//!
//! Tier construction from configuration.
//!
//! # Design
//!
//! Commands use [`create_tiers`] instead of building HTTP clients directly,
//! so the engine only ever sees `Arc<dyn Tier>` and can run against
//! in-memory fakes in tests.

use std::sync::Arc;

use super::http::HttpTier;
use super::traits::{Tier, TierError};
use crate::core::config::{Config, ConfigError};
use crate::core::types::TierKind;

/// The two tiers under comparison.
#[derive(Clone)]
pub struct Tiers {
    pub api: Arc<dyn Tier>,
    pub backend: Arc<dyn Tier>,
}

impl Tiers {
    /// Pair two tiers.
    pub fn new(api: Arc<dyn Tier>, backend: Arc<dyn Tier>) -> Self {
        Self { api, backend }
    }

    /// The tier of the given kind.
    pub fn get(&self, kind: TierKind) -> &Arc<dyn Tier> {
        match kind {
            TierKind::Api => &self.api,
            TierKind::Backend => &self.backend,
        }
    }
}

impl std::fmt::Debug for Tiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tiers")
            .field("api", &self.api.kind())
            .field("backend", &self.backend.kind())
            .finish()
    }
}

/// Errors from tier construction.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot create {kind} tier: {source}")]
    Tier { kind: TierKind, source: TierError },
}

/// Create one HTTP tier from configuration.
///
/// # Errors
///
/// Returns an error if the tier is not configured or its URL is unusable.
pub fn create_tier(config: &Config, kind: TierKind) -> Result<HttpTier, FactoryError> {
    let settings = config.tier(kind)?;
    HttpTier::from_settings(&settings).map_err(|source| FactoryError::Tier { kind, source })
}

/// Create both HTTP tiers from configuration.
///
/// # Errors
///
/// Returns an error if either tier is not configured.
pub fn create_tiers(config: &Config) -> Result<Tiers, FactoryError> {
    let api = create_tier(config, TierKind::Api)?;
    let backend = create_tier(config, TierKind::Backend)?;
    Ok(Tiers::new(Arc::new(api), Arc::new(backend)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_tiers_from_config() {
        let config = Config::from_toml_str(
            r#"
            [api]
            url = "http://localhost:3000"

            [backend]
            url = "http://localhost:5352"
            "#,
        )
        .unwrap();

        let tiers = create_tiers(&config).unwrap();
        assert_eq!(tiers.get(TierKind::Api).kind(), TierKind::Api);
        assert_eq!(tiers.get(TierKind::Backend).kind(), TierKind::Backend);
    }

    #[test]
    fn missing_backend_is_config_error() {
        let config = Config::from_toml_str(
            r#"
            [api]
            url = "http://localhost:3000"
            "#,
        )
        .unwrap();

        let err = create_tiers(&config).unwrap_err();
        assert!(matches!(err, FactoryError::Config(ConfigError::Missing(_))));
        assert_eq!(err.to_string(), "missing config value: backend.url");
    }
}

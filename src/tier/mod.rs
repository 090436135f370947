//! tier
//!
//! Access to the two views of the metadata tree.
//!
//! # Architecture
//!
//! The `Tier` trait defines the interface both the front-end API and the
//! backend storage expose. The engine only sees `Arc<dyn Tier>`; commands
//! obtain real clients through [`create_tiers`].
//!
//! # Modules
//!
//! - `traits`: Core `Tier` trait and `TierError`
//! - [`http`]: HTTP implementation used for both tiers
//! - [`mock`]: In-memory implementation for deterministic testing
//! - [`listing`]: Directory listing parsing and rendering
//! - `factory`: Tier creation from configuration

mod factory;
pub mod http;
pub mod listing;
pub mod mock;
mod traits;

pub use factory::{create_tier, create_tiers, FactoryError, Tiers};
pub use http::HttpTier;
pub use traits::*;

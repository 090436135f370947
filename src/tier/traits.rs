//! tier::traits
//!
//! Tier trait definition for reaching one view of the metadata tree.
//!
//! # Design
//!
//! The `Tier` trait is async because tier access involves network I/O.
//! Both tiers expose the same two verbs: `GET <path>` returns a raw
//! document body and `PUT <path>` stores one. Bodies are opaque bytes; no
//! encoding is assumed. Listings and metadata
//! documents travel through the same calls; interpreting them is the
//! caller's business.
//!
//! # Example
//!
//! ```ignore
//! use tiercheck::tier::{Tier, TierError};
//! use tiercheck::core::types::TreePath;
//!
//! async fn touch(tier: &dyn Tier, path: &TreePath) -> Result<(), TierError> {
//!     let meta = path.meta();
//!     let body = tier.get(&meta).await?;
//!     tier.put(&meta, &body).await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{TierKind, TreePath};

/// Errors from tier operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierError {
    /// The path does not exist on this tier.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials were missing or refused.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The tier answered with a non-success status.
    #[error("rejected: {status} - {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the tier
        message: String,
    },

    /// Network, timeout or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl TierError {
    /// Whether the path is simply absent, as opposed to unreachable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TierError::NotFound(_))
    }
}

/// One view of the hierarchical metadata tree.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so packages can be verified from
/// concurrent tasks.
#[async_trait]
pub trait Tier: Send + Sync {
    /// Which tier this is.
    fn kind(&self) -> TierKind;

    /// Fetch the raw document at `path`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path does not exist
    /// - `Transport` on network or protocol failure
    async fn get(&self, path: &TreePath) -> Result<Vec<u8>, TierError>;

    /// Store `body` verbatim at `path`.
    ///
    /// # Errors
    ///
    /// - `Rejected` if the tier refuses the document
    /// - `Transport` on network or protocol failure
    async fn put(&self, path: &TreePath, body: &[u8]) -> Result<(), TierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_error_display() {
        assert_eq!(
            format!("{}", TierError::NotFound("/source/foo".into())),
            "not found: /source/foo"
        );
        assert_eq!(
            format!("{}", TierError::AuthFailed("bad password".into())),
            "authentication failed: bad password"
        );
        assert_eq!(
            format!(
                "{}",
                TierError::Rejected {
                    status: 400,
                    message: "validation failed".into()
                }
            ),
            "rejected: 400 - validation failed"
        );
        assert_eq!(
            format!("{}", TierError::Transport("connection refused".into())),
            "transport error: connection refused"
        );
        assert_eq!(
            format!("{}", TierError::Malformed("entry without name".into())),
            "malformed response: entry without name"
        );
    }

    #[test]
    fn only_not_found_is_not_found() {
        assert!(TierError::NotFound("/x".into()).is_not_found());
        assert!(!TierError::Transport("x".into()).is_not_found());
    }
}

//! engine::lister
//!
//! Child listings on either tier.
//!
//! The lister is a side-effect-free accessor: every call goes to the tier,
//! nothing is cached, and names come back in the order the tier sent them.

use tracing::debug;

use crate::core::types::{TierKind, TreePath};
use crate::tier::listing::parse_listing;
use crate::tier::{TierError, Tiers};

/// Outcome of a listing where an absent path is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The path exists; its children in tier order.
    Present(Vec<String>),
    /// The path does not exist on this tier.
    Absent,
}

impl Listing {
    /// Children, treating an absent path as empty.
    pub fn into_names(self) -> Vec<String> {
        match self {
            Listing::Present(names) => names,
            Listing::Absent => Vec::new(),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Listing::Absent)
    }
}

/// Lists children of a path on a named tier.
#[derive(Debug, Clone)]
pub struct TreeLister {
    tiers: Tiers,
}

impl TreeLister {
    pub fn new(tiers: Tiers) -> Self {
        Self { tiers }
    }

    /// Children of `path` on `tier`, in tier order.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path does not exist on that tier
    /// - `Transport` on network or protocol failure
    /// - `Malformed` if the listing cannot be parsed
    pub async fn list_children(
        &self,
        tier: TierKind,
        path: &TreePath,
    ) -> Result<Vec<String>, TierError> {
        let document = self.tiers.get(tier).get(path).await?;
        let names = parse_listing(&document)?;
        debug!(%tier, %path, entries = names.len(), "listed children");
        Ok(names)
    }

    /// Like [`TreeLister::list_children`], mapping `NotFound` to
    /// [`Listing::Absent`].
    ///
    /// # Errors
    ///
    /// Any failure other than `NotFound`.
    pub async fn list(&self, tier: TierKind, path: &TreePath) -> Result<Listing, TierError> {
        match self.list_children(tier, path).await {
            Ok(names) => Ok(Listing::Present(names)),
            Err(e) if e.is_not_found() => {
                debug!(%tier, %path, "path absent");
                Ok(Listing::Absent)
            }
            Err(e) => Err(e),
        }
    }
}

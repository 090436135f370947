//! engine::report
//!
//! Discrepancies and the consistency report.
//!
//! # Invariants
//!
//! - An empty report means both tiers list identical content and every
//!   metadata document round-tripped unchanged
//! - Entries keep the order in which they were discovered
//! - One path's discrepancies are appended together, never interleaved with
//!   another path's

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::core::types::{TierKind, TreePath};

/// Category of a recorded disagreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Entry listed by the API but not by the backend.
    MissingInBackend,
    /// Entry listed by the backend but not by the API.
    MissingInApi,
    /// Entry listed more than once by one tier.
    DuplicateEntry,
    /// A node exists on one tier and is absent on the other.
    PathMissing,
    /// A listing could not be obtained or understood.
    ListFailed,
    /// The metadata document could not be fetched.
    FetchFailed,
    /// The tier refused the unchanged metadata document.
    WriteFailed,
    /// The document read back differs from the one written.
    RoundTripMismatch,
}

impl DiscrepancyKind {
    /// Stable snake_case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::MissingInBackend => "missing_in_backend",
            DiscrepancyKind::MissingInApi => "missing_in_api",
            DiscrepancyKind::DuplicateEntry => "duplicate_entry",
            DiscrepancyKind::PathMissing => "path_missing",
            DiscrepancyKind::ListFailed => "list_failed",
            DiscrepancyKind::FetchFailed => "fetch_failed",
            DiscrepancyKind::WriteFailed => "write_failed",
            DiscrepancyKind::RoundTripMismatch => "round_trip_mismatch",
        }
    }

    /// The entry kind reporting an entry only `present_on` lists.
    pub fn missing_from_other(present_on: TierKind) -> Self {
        match present_on {
            TierKind::Api => DiscrepancyKind::MissingInBackend,
            TierKind::Backend => DiscrepancyKind::MissingInApi,
        }
    }
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded disagreement between tiers or across a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub path: TreePath,
    pub kind: DiscrepancyKind,
    pub detail: String,
}

impl Discrepancy {
    pub fn new(path: TreePath, kind: DiscrepancyKind, detail: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.path, self.detail)
    }
}

/// Every discrepancy found by one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    discrepancies: Vec<Discrepancy>,
}

impl ConsistencyReport {
    /// Start an empty report.
    pub fn begin() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            discrepancies: Vec::new(),
        }
    }

    /// Append one discrepancy.
    pub fn record(&mut self, discrepancy: Discrepancy) {
        warn!(
            run_id = %self.run_id,
            kind = %discrepancy.kind,
            path = %discrepancy.path,
            detail = %discrepancy.detail,
            "discrepancy"
        );
        self.discrepancies.push(discrepancy);
    }

    /// Append all discrepancies collected for one path, in order.
    pub fn extend_path(&mut self, bucket: Vec<Discrepancy>) {
        for discrepancy in bucket {
            self.record(discrepancy);
        }
    }

    /// Stamp the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    /// True when no discrepancy was recorded.
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.discrepancies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discrepancies.is_empty()
    }

    /// Count of discrepancies per kind.
    pub fn summary(&self) -> BTreeMap<DiscrepancyKind, usize> {
        let mut counts = BTreeMap::new();
        for discrepancy in &self.discrepancies {
            *counts.entry(discrepancy.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Discrepancies of one kind.
    pub fn of_kind(&self, kind: DiscrepancyKind) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies.iter().filter(move |d| d.kind == kind)
    }
}

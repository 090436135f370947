//! engine
//!
//! Cross-tier consistency checks: List -> Diff -> Round-trip -> Report.
//!
//! # Architecture
//!
//! 1. **List**: [`lister`] fetches child listings from either tier
//! 2. **Diff**: [`differ`] turns two listings of one path into discrepancies
//! 3. **Round-trip**: [`roundtrip`] re-submits a metadata document unchanged
//!    and checks it reads back byte-identical
//! 4. **Report**: [`report`] accumulates every discrepancy of a run
//!
//! [`driver`] walks the tree (root, projects, packages) and sequences the
//! other stages. No check ever aborts a run; failures become discrepancies.
//!
//! # Invariants
//!
//! - Listing comparison never writes to either tier
//! - Round trips only ever write back exactly what was read
//! - Report order depends only on listing order, never on scheduling
//!
//! # Example
//!
//! ```ignore
//! use tiercheck::engine::{TraversalDriver, TraversalOptions};
//!
//! let driver = TraversalDriver::new(tiers, TraversalOptions::new(root));
//! let report = driver.run().await;
//! if !report.is_clean() {
//!     for d in report.discrepancies() {
//!         println!("{}", d);
//!     }
//! }
//! ```

pub mod differ;
pub mod driver;
pub mod lister;
pub mod report;
pub mod roundtrip;

pub use differ::{diff, diff_with, DiffOptions};
pub use driver::{Phase, TraversalDriver, TraversalOptions};
pub use lister::{Listing, TreeLister};
pub use report::{ConsistencyReport, Discrepancy, DiscrepancyKind};
pub use roundtrip::{describe_mismatch, RoundTripVerifier};

//! tiercheck - Consistency harness for two-tier source metadata services
//!
//! A source service is reachable through a front-end API tier and a backend
//! storage tier. tiercheck walks the project/package tree on both, reports
//! every entry one tier lists and the other does not, and re-submits every
//! metadata document unchanged to confirm the write is idempotent.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates List → Diff → Round-trip → Report
//! - [`core`] - Domain types, configuration, ordered attribute values
//! - [`tier`] - Abstraction over the two tiers (HTTP and in-memory)
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. A clean report means both tiers list identical children at every
//!    visited path and every metadata document round-tripped byte-identical
//! 2. Listing comparison never writes to either tier
//! 3. Round trips write back exactly the bytes they read
//! 4. No tier failure aborts a run; it becomes a discrepancy instead

pub mod cli;
pub mod core;
pub mod engine;
pub mod tier;
pub mod ui;

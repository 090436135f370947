//! core
//!
//! Core domain types and configuration for tiercheck.
//!
//! # Modules
//!
//! - [`types`] - Strong types: TreePath, TierKind
//! - [`attrib`] - Positional attribute values with type-level defaults
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Nothing here performs I/O except config loading

pub mod attrib;
pub mod config;
pub mod types;

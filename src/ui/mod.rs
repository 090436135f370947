//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and report rendering
//!
//! # Design
//!
//! All output goes through this module so quiet mode and the text/JSON
//! split are handled in one place.

pub mod output;

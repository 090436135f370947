//! cli
//!
//! Command-line interface layer for tiercheck.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, resolves
//! configuration, and hands the tiers to the [`crate::engine`]. Exit status
//! is derived from the report.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Exit status when the report carries discrepancies.
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Exit status for setup errors (bad config, bad arguments).
pub const EXIT_SETUP_ERROR: u8 = 2;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse_args();

    let ctx = Context {
        config: cli.config.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };
    init_logging(ctx.verbosity());

    commands::dispatch(cli.command, &ctx)
}

/// Install the stderr log subscriber.
///
/// `--debug` and `--quiet` pin the level; otherwise `RUST_LOG` applies,
/// falling back to warnings only.
fn init_logging(verbosity: Verbosity) {
    let filter = match verbosity {
        Verbosity::Normal => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive())),
        pinned => EnvFilter::new(pinned.log_directive()),
    };

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

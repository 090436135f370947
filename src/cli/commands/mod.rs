//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves configuration and applies command-line overrides
//! 2. Calls the engine
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! `check` talks to both tiers over the network. It creates its own tokio
//! runtime and blocks on the traversal, so the rest of the CLI stays
//! synchronous.

mod check;
mod completion;
mod config_cmd;

// Re-export command functions for testing and direct invocation
pub use check::check;
pub use completion::completion;
pub use config_cmd::show as config_show;

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use super::args::{Command, OverrideArgs};
use super::Context;
use crate::core::config::{Config, Overrides};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<ExitCode> {
    match command {
        Command::Check(args) => check::check(ctx, args),
        Command::Config(overrides) => {
            config_show(ctx, &overrides)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Completion { shell } => {
            completion(shell)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load configuration, report warnings, and apply overrides.
pub(crate) fn load_config(ctx: &Context, overrides: &OverrideArgs) -> Result<Config> {
    let result = Config::load(ctx.config.as_deref()).context("Failed to load config")?;
    for warning in &result.warnings {
        output::warn(
            format!("{}: {}", warning.path.display(), warning.message),
            ctx.verbosity(),
        );
    }

    let mut config = result.config;
    config
        .apply(&Overrides::from(overrides))
        .context("Invalid command-line override")?;
    Ok(config)
}

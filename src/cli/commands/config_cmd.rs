//! config command - Show the effective configuration

use anyhow::{Context as _, Result};

use super::load_config;
use crate::cli::args::OverrideArgs;
use crate::cli::Context;

/// Print the merged configuration as TOML, passwords redacted.
pub fn show(ctx: &Context, overrides: &OverrideArgs) -> Result<()> {
    let config = load_config(ctx, overrides)?;

    if !ctx.quiet {
        match config.loaded_from() {
            Some(path) => println!("# Loaded from {}", path.display()),
            None => println!("# No config file found; using defaults"),
        }
    }

    let rendered =
        toml::to_string_pretty(&config.redacted()).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

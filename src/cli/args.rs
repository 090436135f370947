//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Overrides;
use crate::engine::Phase;

/// tiercheck - Consistency harness for two-tier source metadata services
#[derive(Parser, Debug)]
#[command(name = "tiercheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; only errors are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare both tiers and round-trip every metadata document
    #[command(
        long_about = "Compare both tiers and round-trip every metadata document.\n\n\
            Lists projects and packages on the API and the backend and reports every \
            entry one tier lists and the other does not. Then re-submits each project's \
            and package's metadata to the API unchanged and reports any document that \
            reads back different.\n\n\
            Exit status is 0 when no discrepancy was found and 1 otherwise.",
        after_help = "\
EXAMPLES:
    # Full check against the configured tiers
    tiercheck check

    # Listings only; nothing is written
    tiercheck check --phase lists

    # Verify packages four at a time and emit JSON
    tiercheck check --concurrency 4 --json"
    )]
    Check(CheckArgs),

    /// Show the effective configuration
    #[command(
        long_about = "Show the effective configuration.\n\n\
            Prints the merged configuration (file values with command-line overrides \
            applied) as TOML, with passwords redacted, and the file it was loaded from."
    )]
    Config(OverrideArgs),

    /// Generate shell completion scripts
    #[command(after_help = "\
INSTALLATION:
    # Bash
    tiercheck completion bash > ~/.local/share/bash-completion/completions/tiercheck

    # Zsh
    tiercheck completion zsh > ~/.zfunc/_tiercheck

    # Fish
    tiercheck completion fish > ~/.config/fish/completions/tiercheck.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `tiercheck check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Which checks to run
    #[arg(long, value_enum, default_value_t = PhaseArg::All)]
    pub phase: PhaseArg,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Command-line overrides for configuration values.
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Base URL of the API tier
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Base URL of the backend tier
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Root of the source tree
    #[arg(long, value_name = "PATH")]
    pub root: Option<String>,

    /// Packages verified at once within a project
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Report names listed more than once by one tier
    #[arg(long)]
    pub flag_duplicates: bool,
}

impl From<&OverrideArgs> for Overrides {
    fn from(args: &OverrideArgs) -> Self {
        Overrides {
            api_url: args.api_url.clone(),
            backend_url: args.backend_url.clone(),
            root: args.root.clone(),
            concurrency: args.concurrency,
            flag_duplicates: args.flag_duplicates,
        }
    }
}

/// Checks selectable with `--phase`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseArg {
    /// Listing comparison and round trips
    All,
    /// Listing comparison only
    Lists,
    /// Round trips only
    Resubmit,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::All => Phase::All,
            PhaseArg::Lists => Phase::Lists,
            PhaseArg::Resubmit => Phase::Resubmit,
        }
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

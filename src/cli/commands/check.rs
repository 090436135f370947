//! check command - Compare both tiers and round-trip metadata

use std::process::ExitCode;

use anyhow::{Context as _, Result};

use super::load_config;
use crate::cli::args::CheckArgs;
use crate::cli::{Context, EXIT_DISCREPANCIES};
use crate::engine::{DiffOptions, TraversalDriver, TraversalOptions};
use crate::tier::create_tiers;
use crate::ui::output;

/// Run the harness and print the report.
///
/// Returns exit status 0 for a clean report and 1 otherwise.
pub fn check(ctx: &Context, args: CheckArgs) -> Result<ExitCode> {
    let config = load_config(ctx, &args.overrides)?;
    let verbosity = ctx.verbosity();

    let tiers = create_tiers(&config).context("Failed to set up tier clients")?;
    let options = TraversalOptions {
        root: config.root()?,
        concurrency: config.concurrency(),
        phase: args.phase.into(),
        diff: DiffOptions {
            flag_duplicates: config.flag_duplicates(),
        },
    };
    output::debug(format!("traversal options: {:?}", options), verbosity);

    let driver = TraversalDriver::new(tiers, options);
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(driver.run());

    if args.json {
        println!(
            "{}",
            output::render_json(&report).context("Failed to serialize report")?
        );
    } else {
        output::print(output::render_text(&report), verbosity);
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_DISCREPANCIES))
    }
}

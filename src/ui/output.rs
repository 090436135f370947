//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, the report is machine-readable JSON.
//! Reports go to stdout; diagnostics go to stderr.

use std::fmt::Display;
use std::fmt::Write as _;

use crate::engine::ConsistencyReport;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default `tracing` filter directive for this verbosity.
    pub fn log_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Debug => "debug",
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable report.
///
/// ```text
/// run 5f0c...: 2 discrepancies
///   missing_in_backend /source/zlib: entry 'zlib' listed by api but not by backend
///   round_trip_mismatch /source/apache/_meta: expected 40 bytes ...
///
/// summary:
///   missing_in_backend: 1
///   round_trip_mismatch: 1
/// ```
pub fn render_text(report: &ConsistencyReport) -> String {
    if report.is_clean() {
        return format!("run {}: clean", report.run_id);
    }

    let mut out = String::new();
    let noun = if report.len() == 1 {
        "discrepancy"
    } else {
        "discrepancies"
    };
    let _ = writeln!(out, "run {}: {} {}", report.run_id, report.len(), noun);
    out.push_str(&format_list(report.discrepancies(), "  "));
    out.push_str("\n\nsummary:\n");

    let summary: Vec<String> = report
        .summary()
        .into_iter()
        .map(|(kind, count)| format!("{}: {}", kind, count))
        .collect();
    out.push_str(&format_list(&summary, "  "));
    out
}

/// Pretty-printed JSON report.
pub fn render_json(report: &ConsistencyReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TreePath;
    use crate::engine::{Discrepancy, DiscrepancyKind};

    fn report() -> ConsistencyReport {
        let mut report = ConsistencyReport::begin();
        report.record(Discrepancy::new(
            TreePath::new("/source/zlib").unwrap(),
            DiscrepancyKind::MissingInBackend,
            "entry 'zlib' listed by api but not by backend",
        ));
        report.finish()
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::Debug.log_directive(), "debug");
    }

    #[test]
    fn clean_report_is_one_line() {
        let report = ConsistencyReport::begin().finish();
        let text = render_text(&report);
        assert_eq!(text, format!("run {}: clean", report.run_id));
    }

    #[test]
    fn text_lists_entries_and_summary() {
        let report = report();
        let text = render_text(&report);
        let body: Vec<&str> = text.lines().skip(1).collect();

        assert!(text.starts_with(&format!("run {}: 1 discrepancy\n", report.run_id)));
        assert_eq!(
            body,
            vec![
                "  missing_in_backend /source/zlib: entry 'zlib' listed by api but not by backend",
                "",
                "summary:",
                "  missing_in_backend: 1",
            ]
        );
    }

    #[test]
    fn json_carries_kinds_and_run_id() {
        let report = report();
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["run_id"], report.run_id.to_string());
        assert_eq!(json["discrepancies"][0]["kind"], "missing_in_backend");
        assert_eq!(json["discrepancies"][0]["path"], "/source/zlib");
        assert!(json["finished_at"].is_string());
    }
}

//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag. Health
//! reports render one line per result with a status glyph, matching the
//! registry order the evaluator produced.

use std::fmt::Display;

use crate::engine::{CheckStatus, HealthReport};

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

/// Print a success message (respects quiet mode).
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Glyph for a check status.
pub fn status_glyph(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "✓",
        CheckStatus::Warn => "!",
        CheckStatus::Fail => "✗",
    }
}

/// Render a health report as one line per result.
pub fn format_report(report: &HealthReport) -> String {
    let mut out = String::new();
    for result in report.results() {
        out.push_str(&format!(
            "  {} {:<22} {}\n",
            status_glyph(result.status),
            result.check,
            result.message
        ));
        if result.status != CheckStatus::Pass {
            if let Some(hint) = &result.remediation {
                out.push_str(&format!("      hint: {}\n", hint));
            }
        }
    }
    out.push_str(&format!(
        "\n  overall: {} ({} checks, {} warn, {} fail)",
        report.overall(),
        report.len(),
        report.warn_count(),
        report.fail_count()
    ));
    out
}

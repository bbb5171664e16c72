//! engine::gate
//!
//! Health gating for action execution.
//!
//! # Architecture
//!
//! Each action declares the minimum overall health it requires. Gating
//! compares a [`HealthReport`]'s overall status against that threshold and
//! either admits the action or produces a [`GateBlock`] bundling the
//! results that hold it back.
//!
//! **Key insight:** there is no global "environment is valid" boolean. Each
//! action has its own threshold: `validate` and `clean` run against any
//! environment, `dev` and `build` tolerate warnings, and database actions
//! require a fully passing report.
//!
//! # Invariants
//!
//! - Gating never admits an action whose threshold is not met
//! - Gating is deterministic given the same report

use super::health::{CheckResult, CheckStatus, HealthReport};

/// Minimum overall health an action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthGate {
    /// No gate; the action runs against any environment.
    Ungated,
    /// Overall status must be `warn` or better (`fail` blocks).
    WarnOrBetter,
    /// Overall status must be `pass`.
    PassOnly,
}

impl HealthGate {
    /// Whether a report with this overall status meets the gate.
    pub fn admits(&self, overall: CheckStatus) -> bool {
        match self {
            HealthGate::Ungated => true,
            HealthGate::WarnOrBetter => overall <= CheckStatus::Warn,
            HealthGate::PassOnly => overall == CheckStatus::Pass,
        }
    }

    /// Whether this gate ever needs a health report.
    pub fn requires_report(&self) -> bool {
        !matches!(self, HealthGate::Ungated)
    }
}

impl std::fmt::Display for HealthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthGate::Ungated => write!(f, "none"),
            HealthGate::WarnOrBetter => write!(f, "warn-or-better"),
            HealthGate::PassOnly => write!(f, "pass-only"),
        }
    }
}

/// Result of a gating check.
#[derive(Debug)]
pub enum GateResult {
    /// Threshold met; the action may proceed.
    Ready,
    /// Threshold missed.
    Blocked(GateBlock),
}

impl GateResult {
    /// Whether gating passed.
    pub fn is_ready(&self) -> bool {
        matches!(self, GateResult::Ready)
    }
}

/// Why a gate blocked an action.
#[derive(Debug)]
pub struct GateBlock {
    /// The gate that was missed.
    pub gate: HealthGate,
    /// The report's overall status.
    pub overall: CheckStatus,
    /// Results at or above the blocking severity, in report order.
    pub blocking: Vec<CheckResult>,
}

impl GateBlock {
    /// One-line summary naming the gate.
    pub fn summary(&self) -> String {
        let n = self.blocking.len();
        format!(
            "environment is {} but this action requires {} ({} blocking check{})",
            self.overall,
            self.gate,
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

impl std::fmt::Display for GateBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Check a report against a gate.
pub fn gate(report: &HealthReport, threshold: HealthGate) -> GateResult {
    let overall = report.overall();
    if threshold.admits(overall) {
        return GateResult::Ready;
    }

    // Everything at fail blocks; under PassOnly warnings block too.
    let floor = match threshold {
        HealthGate::PassOnly => CheckStatus::Warn,
        _ => CheckStatus::Fail,
    };
    let blocking = report
        .results()
        .iter()
        .filter(|r| r.status >= floor)
        .cloned()
        .collect();

    GateResult::Blocked(GateBlock {
        gate: threshold,
        overall,
        blocking,
    })
}

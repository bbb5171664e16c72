//! engine::health
//!
//! Health report types for environment validation.
//!
//! # Architecture
//!
//! The evaluator produces a [`HealthReport`]: an ordered sequence of
//! [`CheckResult`]s (registry order) plus an overall status computed as the
//! worst individual status under `Fail > Warn > Pass`. Results carry stable,
//! deterministic IDs so the same underlying problem keeps the same identity
//! across runs.
//!
//! # Example
//!
//! ```
//! use devhand::engine::health::{CheckResult, CheckStatus, HealthReport};
//!
//! let report = HealthReport::from_results(vec![
//!     CheckResult::pass("node-installed", "Node.js v22.1.0"),
//!     CheckResult::warn("frontend-env", ".env not found")
//!         .with_remediation("run 'dh setup'"),
//! ]);
//!
//! assert_eq!(report.overall(), CheckStatus::Warn);
//! ```

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Outcome of a single check.
///
/// Ordered by severity: `Pass < Warn < Fail`, so the worst status of a
/// report is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The check passed.
    Pass,
    /// The check found a non-blocking problem.
    Warn,
    /// The check failed.
    Fail,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "pass"),
            CheckStatus::Warn => write!(f, "warn"),
            CheckStatus::Fail => write!(f, "fail"),
        }
    }
}

/// A stable, deterministic result identifier.
///
/// IDs are computed from the check name and a key (typically the project
/// path), making them stable across runs for the same underlying subject.
///
/// # Example
///
/// ```
/// use devhand::engine::health::ResultId;
///
/// let id = ResultId::new("node-installed", "/ws/hello-world-fe");
/// assert!(id.as_str().starts_with("node-installed:"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResultId(String);

impl ResultId {
    /// Create a result ID from a check name and key.
    ///
    /// The ID is formatted as `name:hash(key)` where hash is a truncated
    /// SHA-256 of the key.
    pub fn new(check_name: &str, key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = hasher.finalize();
        let short_hash = hex::encode(&hash[..4]); // 8 hex chars
        Self(format!("{}:{}", check_name, short_hash))
    }

    /// Create a result ID from just a check name (no key).
    ///
    /// Use this for checks whose subject is the whole workspace.
    pub fn singleton(check_name: &str) -> Self {
        Self(check_name.to_string())
    }

    /// Get the string representation of the ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The outcome of one executed check.
///
/// Immutable value produced per execution. Expected absences (a missing
/// file, an uninstalled tool) are results, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Stable identifier for this result.
    pub id: ResultId,
    /// Name of the check that produced it.
    pub check: String,
    /// Outcome status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Optional remediation hint.
    pub remediation: Option<String>,
}

impl CheckResult {
    fn new(check: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            id: ResultId::singleton(check),
            check: check.to_string(),
            status,
            message: message.into(),
            remediation: None,
        }
    }

    /// Create a passing result.
    pub fn pass(check: &str, message: impl Into<String>) -> Self {
        Self::new(check, CheckStatus::Pass, message)
    }

    /// Create a warning result.
    pub fn warn(check: &str, message: impl Into<String>) -> Self {
        Self::new(check, CheckStatus::Warn, message)
    }

    /// Create a failing result.
    pub fn fail(check: &str, message: impl Into<String>) -> Self {
        Self::new(check, CheckStatus::Fail, message)
    }

    /// Key the result ID to a subject (typically the project path).
    pub fn keyed(mut self, key: &str) -> Self {
        self.id = ResultId::new(&self.check, key);
        self
    }

    /// Attach a remediation hint.
    pub fn with_remediation(mut self, hint: impl Into<String>) -> Self {
        self.remediation = Some(hint.into());
        self
    }

    /// Whether this result fails the report.
    pub fn is_fail(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}

/// An ordered collection of check results.
///
/// Order is registry order. Created fresh per evaluation; never persisted
/// across runs, since the environment may have changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    results: Vec<CheckResult>,
}

impl HealthReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a report from results, preserving their order.
    pub fn from_results(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    /// Append a result.
    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// All results, in registry order.
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Overall status: the worst individual status.
    ///
    /// An empty report is `Pass` (nothing applicable found nothing wrong).
    pub fn overall(&self) -> CheckStatus {
        self.results
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(CheckStatus::Pass)
    }

    /// Results with the given status.
    pub fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(move |r| r.status == status)
    }

    /// Number of failing results.
    pub fn fail_count(&self) -> usize {
        self.with_status(CheckStatus::Fail).count()
    }

    /// Number of warning results.
    pub fn warn_count(&self) -> usize {
        self.with_status(CheckStatus::Warn).count()
    }

    /// Whether the report is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Names of the checks that produced results, in order.
    pub fn check_names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.check.as_str()).collect()
    }
}

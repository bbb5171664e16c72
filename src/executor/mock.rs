//! executor::mock
//!
//! Mock executor for deterministic testing.
//!
//! # Design
//!
//! The mock records every plan it is handed and returns a configurable
//! outcome, so tests can assert on what the engine decided without
//! spawning processes or touching the filesystem.
//!
//! # Example
//!
//! ```
//! use devhand::executor::{MockExecutor, PlanExecutor};
//! use devhand::engine::{ActionPlan, HealthGate, PlanTarget};
//! use std::collections::BTreeMap;
//!
//! let executor = MockExecutor::new();
//! let plan = ActionPlan {
//!     action: "dev",
//!     target: PlanTarget { path: "/ws/fe".into(), role: None },
//!     params: BTreeMap::new(),
//!     gate: HealthGate::WarnOrBetter,
//! };
//!
//! executor.execute(&plan).unwrap();
//! assert_eq!(executor.executed().len(), 1);
//! assert_eq!(executor.executed()[0].action, "dev");
//! ```

use std::sync::{Arc, Mutex};

use super::{ExecuteError, ExecuteOutcome, PlanExecutor};
use crate::engine::ActionPlan;

/// Recording executor for tests.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    inner: Arc<Mutex<MockExecutorInner>>,
}

#[derive(Debug, Default)]
struct MockExecutorInner {
    executed: Vec<ActionPlan>,
    exit_code: i32,
}

impl MockExecutor {
    /// Create a mock that reports success for every plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose outcomes carry the given exit code.
    pub fn with_exit_code(exit_code: i32) -> Self {
        let mock = Self::default();
        mock.inner
            .lock()
            .expect("mock executor lock poisoned")
            .exit_code = exit_code;
        mock
    }

    /// Plans executed so far, in order.
    pub fn executed(&self) -> Vec<ActionPlan> {
        self.inner
            .lock()
            .expect("mock executor lock poisoned")
            .executed
            .clone()
    }
}

impl PlanExecutor for MockExecutor {
    fn execute(&self, plan: &ActionPlan) -> Result<ExecuteOutcome, ExecuteError> {
        let mut inner = self.inner.lock().expect("mock executor lock poisoned");
        inner.executed.push(plan.clone());
        Ok(ExecuteOutcome {
            exit_code: inner.exit_code,
            summary: format!("mock executed '{}'", plan.action),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HealthGate, PlanTarget};
    use std::collections::BTreeMap;

    fn sample_plan(action: &'static str) -> ActionPlan {
        ActionPlan {
            action,
            target: PlanTarget {
                path: "/ws/app".into(),
                role: None,
            },
            params: BTreeMap::new(),
            gate: HealthGate::Ungated,
        }
    }

    #[test]
    fn records_plans_in_order() {
        let executor = MockExecutor::new();
        executor.execute(&sample_plan("dev")).unwrap();
        executor.execute(&sample_plan("clean")).unwrap();

        let executed = executor.executed();
        assert_eq!(executed.len(), 2);
        assert_eq!(executed[0].action, "dev");
        assert_eq!(executed[1].action, "clean");
    }

    #[test]
    fn clones_share_recordings() {
        let executor = MockExecutor::new();
        let clone = executor.clone();
        clone.execute(&sample_plan("build")).unwrap();
        assert_eq!(executor.executed().len(), 1);
    }

    #[test]
    fn configured_exit_code_propagates() {
        let executor = MockExecutor::with_exit_code(7);
        let outcome = executor.execute(&sample_plan("dev")).unwrap();
        assert_eq!(outcome.exit_code, 7);
    }
}

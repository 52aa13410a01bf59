//! Outcome of a saga run, step by step.

use std::time::Duration;

use crate::state::SagaState;

/// Where a single step ended up after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Never executed: the run failed before reaching it.
    Pending,
    /// `execute` succeeded and no rollback touched it.
    Executed,
    /// `execute` returned the error that triggered rollback.
    Failed,
    /// `execute` succeeded and was later compensated.
    Compensated,
    /// `execute` succeeded but its compensation failed with this message.
    CompensationFailed(String),
}

impl StepStatus {
    /// True if the step's forward action succeeded, whether or not it was later
    /// compensated.
    pub fn is_executed(&self) -> bool {
        matches!(
            self,
            StepStatus::Executed | StepStatus::Compensated | StepStatus::CompensationFailed(_)
        )
    }
}

/// A step's name and final status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub name: &'static str,
    pub status: StepStatus,
}

/// Record of one orchestrator run.
#[derive(Debug, Clone)]
pub struct SagaReport {
    name: &'static str,
    state: SagaState,
    steps: Vec<StepRecord>,
    compensated: Vec<&'static str>,
    duration: Duration,
}

impl SagaReport {
    pub(crate) fn new(
        name: &'static str,
        state: SagaState,
        steps: Vec<StepRecord>,
        compensated: Vec<&'static str>,
        duration: Duration,
    ) -> Self {
        Self {
            name,
            state,
            steps,
            compensated,
            duration,
        }
    }

    /// Name of the saga.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Final state of the run.
    pub fn state(&self) -> SagaState {
        self.state
    }

    /// Every step in execution order.
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Wall-clock time spent in the run, rollback included.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True if the run completed without failure.
    pub fn is_success(&self) -> bool {
        self.state == SagaState::Completed
    }

    /// Names of steps whose forward action succeeded, in execution order.
    pub fn executed_steps(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|record| record.status.is_executed())
            .map(|record| record.name)
            .collect()
    }

    /// The step whose failure triggered rollback, if any.
    pub fn failed_step(&self) -> Option<&'static str> {
        self.steps
            .iter()
            .find(|record| record.status == StepStatus::Failed)
            .map(|record| record.name)
    }

    /// Steps whose compensation was attempted, in the order it ran.
    ///
    /// Includes compensations that failed.
    pub fn compensated_steps(&self) -> &[&'static str] {
        &self.compensated
    }

    /// Steps whose compensation failed, with the error message.
    pub fn compensation_failures(&self) -> Vec<(&'static str, &str)> {
        self.steps
            .iter()
            .filter_map(|record| match &record.status {
                StepStatus::CompensationFailed(message) => Some((record.name, message.as_str())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &'static str, status: StepStatus) -> StepRecord {
        StepRecord { name, status }
    }

    #[test]
    fn is_executed_covers_compensated_steps() {
        assert!(!StepStatus::Pending.is_executed());
        assert!(!StepStatus::Failed.is_executed());
        assert!(StepStatus::Executed.is_executed());
        assert!(StepStatus::Compensated.is_executed());
        assert!(StepStatus::CompensationFailed("boom".to_string()).is_executed());
    }

    #[test]
    fn report_queries() {
        let report = SagaReport::new(
            "test",
            SagaState::RolledBack,
            vec![
                record("a", StepStatus::Compensated),
                record("b", StepStatus::CompensationFailed("gone".to_string())),
                record("c", StepStatus::Failed),
                record("d", StepStatus::Pending),
            ],
            vec!["b", "a"],
            Duration::from_millis(3),
        );

        assert!(!report.is_success());
        assert_eq!(report.failed_step(), Some("c"));
        assert_eq!(report.executed_steps(), vec!["a", "b"]);
        assert_eq!(report.compensated_steps(), &["b", "a"]);
        assert_eq!(report.compensation_failures(), vec![("b", "gone")]);
    }
}

//! Saga run state machine.

use serde::{Deserialize, Serialize};

/// The state of one saga run.
///
/// State transitions:
/// ```text
/// NotStarted ──► Running ──┬──► Completed
///                          └──► RollingBack ──► RolledBack
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// No step has been executed yet.
    #[default]
    NotStarted,

    /// Steps are being executed in order.
    Running,

    /// A step failed and earlier steps are being compensated.
    RollingBack,

    /// Every step succeeded (terminal state).
    Completed,

    /// A step failed and rollback has finished (terminal state).
    RolledBack,
}

impl SagaState {
    /// Returns true if the saga can begin running.
    pub fn can_run(&self) -> bool {
        matches!(self, SagaState::NotStarted)
    }

    /// Returns true if the saga can begin rolling back.
    pub fn can_roll_back(&self) -> bool {
        matches!(self, SagaState::Running)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Completed | SagaState::RolledBack)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::NotStarted => "NotStarted",
            SagaState::Running => "Running",
            SagaState::RollingBack => "RollingBack",
            SagaState::Completed => "Completed",
            SagaState::RolledBack => "RolledBack",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Saga pattern implementation for short, statically-known pipelines.
//!
//! A saga is an ordered list of [`Step`]s. Each step has a forward action and a
//! compensating action. The [`Orchestrator`] executes the steps in the order
//! they were added; if one fails, the steps that already succeeded are
//! compensated in reverse order and the original error is returned.
//!
//! Compensation is best-effort: a failing compensation is logged and recorded
//! in the [`SagaReport`], but never replaces the error that triggered the
//! rollback. There is no retry, no persistence across restarts and no
//! parallelism between steps.

pub mod orchestrator;
pub mod report;
pub mod state;
pub mod step;

pub use orchestrator::Orchestrator;
pub use report::{SagaReport, StepRecord, StepStatus};
pub use state::SagaState;
pub use step::Step;

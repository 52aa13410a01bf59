//! Sequential saga runner.

use std::fmt::Display;
use std::time::Instant;

use crate::report::{SagaReport, StepRecord, StepStatus};
use crate::state::SagaState;
use crate::step::Step;

struct StepEntry<C, E>
where
    C: Send + 'static,
    E: Send + 'static,
{
    step: Box<dyn Step<C, E>>,
    status: StepStatus,
}

/// Runs an ordered list of steps and compensates on failure.
///
/// Steps execute in the order they were added. When a step fails, every step
/// before it that executed successfully is compensated, last one first; the
/// failed step itself is never compensated. The caller always gets back the
/// error of the step that failed, regardless of how compensation went.
///
/// An orchestrator is built for one logical operation and consumed by
/// [`run`](Self::run), so it cannot be reused.
pub struct Orchestrator<C, E>
where
    C: Send + 'static,
    E: Send + 'static,
{
    name: &'static str,
    steps: Vec<StepEntry<C, E>>,
    state: SagaState,
    compensated: Vec<&'static str>,
}

impl<C, E> Orchestrator<C, E>
where
    C: Send + 'static,
    E: Display + Send + 'static,
{
    /// Creates an empty orchestrator. `name` labels its logs and metrics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
            state: SagaState::NotStarted,
            compensated: Vec::new(),
        }
    }

    /// Appends a step to the end of the chain.
    pub fn add_step(&mut self, step: impl Step<C, E> + 'static) -> &mut Self {
        self.push(Box::new(step));
        self
    }

    /// Appends steps to the end of the chain, in iteration order.
    pub fn add_steps<I>(&mut self, steps: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn Step<C, E>>>,
    {
        for step in steps {
            self.push(step);
        }
        self
    }

    /// Builder-style variant of [`add_step`](Self::add_step).
    pub fn with_step(mut self, step: impl Step<C, E> + 'static) -> Self {
        self.push(Box::new(step));
        self
    }

    fn push(&mut self, step: Box<dyn Step<C, E>>) {
        self.steps.push(StepEntry {
            step,
            status: StepStatus::Pending,
        });
    }

    /// Name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of steps in the chain.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no step has been added.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|entry| entry.step.name()).collect()
    }

    /// Runs the saga against `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step whose `execute` failed, after
    /// compensating the steps that ran before it.
    pub async fn run(self, ctx: &mut C) -> Result<(), E> {
        let (result, _report) = self.run_with_report(ctx).await;
        result
    }

    /// Runs the saga and also returns a per-step report of the run.
    #[tracing::instrument(skip_all, fields(saga = self.name, steps = self.steps.len()))]
    pub async fn run_with_report(mut self, ctx: &mut C) -> (Result<(), E>, SagaReport) {
        debug_assert!(self.state.can_run());
        metrics::counter!("saga_runs_total", "saga" => self.name).increment(1);
        let started = Instant::now();
        self.state = SagaState::Running;

        let mut result = Ok(());
        for index in 0..self.steps.len() {
            let entry = &mut self.steps[index];
            let step_name = entry.step.name();
            tracing::debug!(step = step_name, "saga step started");

            match entry.step.execute(ctx).await {
                Ok(()) => {
                    entry.status = StepStatus::Executed;
                }
                Err(error) => {
                    entry.status = StepStatus::Failed;
                    tracing::warn!(step = step_name, error = %error, "saga step failed, rolling back");
                    self.roll_back(index, ctx).await;
                    result = Err(error);
                    break;
                }
            }
        }

        if result.is_ok() {
            self.state = SagaState::Completed;
            metrics::counter!("saga_completed_total", "saga" => self.name).increment(1);
        }

        debug_assert!(self.state.is_terminal());
        let duration = started.elapsed();
        metrics::histogram!(
            "saga_duration_seconds",
            "saga" => self.name,
            "outcome" => self.state.as_str()
        )
        .record(duration.as_secs_f64());
        tracing::debug!(state = %self.state, ?duration, "saga finished");

        (result, self.into_report(duration))
    }

    /// Compensates executed steps before `failed`, walking backwards.
    async fn roll_back(&mut self, failed: usize, ctx: &mut C) {
        debug_assert!(self.state.can_roll_back());
        self.state = SagaState::RollingBack;
        metrics::counter!("saga_rolled_back_total", "saga" => self.name).increment(1);

        for entry in self.steps[..failed].iter_mut().rev() {
            if !entry.status.is_executed() {
                continue;
            }

            let step_name = entry.step.name();
            self.compensated.push(step_name);

            match entry.step.compensate(ctx).await {
                Ok(()) => {
                    entry.status = StepStatus::Compensated;
                    tracing::debug!(step = step_name, "saga step compensated");
                }
                Err(error) => {
                    metrics::counter!("saga_compensation_failures_total", "saga" => self.name)
                        .increment(1);
                    tracing::warn!(step = step_name, error = %error, "failed to compensate saga step");
                    entry.status = StepStatus::CompensationFailed(error.to_string());
                }
            }
        }

        self.state = SagaState::RolledBack;
        tracing::info!(
            state = %self.state,
            compensated = self.compensated.len(),
            "saga rolled back"
        );
    }

    fn into_report(self, duration: std::time::Duration) -> SagaReport {
        let steps = self
            .steps
            .into_iter()
            .map(|entry| StepRecord {
                name: entry.step.name(),
                status: entry.status,
            })
            .collect();
        SagaReport::new(self.name, self.state, steps, self.compensated, duration)
    }
}

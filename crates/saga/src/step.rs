use async_trait::async_trait;

/// A unit of work with a forward action and a best-effort reverse action.
///
/// `C` is the shared mutable context of one saga run (for example the entity
/// being created). The orchestrator lends it to each step in turn, so a step
/// can read whatever earlier steps wrote into it. Steps never link to each
/// other; ordering and execution state belong to the [`Orchestrator`].
///
/// [`Orchestrator`]: crate::Orchestrator
#[async_trait]
pub trait Step<C, E>: Send
where
    C: Send + 'static,
    E: Send + 'static,
{
    /// Diagnostic label used in logs and in the run report.
    fn name(&self) -> &'static str;

    /// Performs the forward action. Called at most once per run.
    async fn execute(&mut self, ctx: &mut C) -> Result<(), E>;

    /// Reverses the effect of a successful `execute`.
    ///
    /// Only invoked during rollback, and only if `execute` succeeded. Errors
    /// are logged by the orchestrator and otherwise ignored.
    ///
    /// The default implementation does nothing, for steps with nothing to undo.
    async fn compensate(&mut self, ctx: &mut C) -> Result<(), E> {
        let _ = ctx;
        Ok(())
    }
}

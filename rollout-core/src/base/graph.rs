//! Graph manager.
use super::phase::RunPhase;
use crate::config::{AlgorithmConfig, TaskParameters};
use anyhow::Result;

/// The agent/environment/algorithm stack consumed by a worker.
///
/// All of the hard machinery lives behind this trait: neural-network
/// execution, environment stepping and checkpoint deserialization are the
/// implementor's business. The worker only drives the narrow surface below.
///
/// Errors from [`evaluate`](Self::evaluate) and
/// [`restore_checkpoint`](Self::restore_checkpoint) are fatal to the worker:
/// the coordinator propagates them without retrying. Recovering from a
/// half-restored model is the orchestrator's job, not the loop's.
pub trait GraphManager {
    /// Builds the computation graph for the given task.
    fn create_graph(&mut self, task_parameters: &TaskParameters) -> Result<()>;

    /// Runs evaluation for the given number of steps.
    ///
    /// Returns `true` once evaluation is finished for good, e.g. the target
    /// score was reached.
    fn evaluate(&mut self, steps: usize) -> Result<bool>;

    /// Restores model state from the most recent checkpoint on disk.
    fn restore_checkpoint(&mut self) -> Result<()>;

    /// Switches the run phase.
    ///
    /// Callers should prefer the scoped [`PhaseContext`] wrapper, which
    /// guarantees the phase is reset on every exit path.
    ///
    /// [`PhaseContext`]: super::PhaseContext
    fn set_phase(&mut self, phase: RunPhase);

    /// Total improvement-step budget of the training run.
    fn improve_steps(&self) -> usize;

    /// Number of steps per evaluation call.
    fn evaluation_steps(&self) -> usize;

    /// Algorithm configuration, read-only to workers.
    fn algorithm(&self) -> &AlgorithmConfig;
}

use super::EvalWorkerConfig;
use crate::util::{wait_for_checkpoint, wait_for_trainer_ready};
use anyhow::Result;
use log::info;
use rollout_core::{
    error::RolloutError, CheckpointStateReader, DataStore, GraphManager, PhaseContext, RunPhase,
    StopSignal, SyncGate, SyncMode, TaskParameters, WaitOutcome,
};
use std::marker::PhantomData;

/// States of the evaluation worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the trainer to publish its first checkpoint.
    AwaitingFirstCheckpoint,

    /// Waiting for the trainer-ready marker.
    AwaitingTrainerReady,

    /// Between iterations of the bounded evaluation loop.
    Iterating,

    /// Running evaluation steps.
    Evaluating,

    /// Blocking until the trainer publishes a newer checkpoint (sync mode).
    AwaitingNewerCheckpoint,

    /// Terminal: evaluation finished or the iteration budget was exhausted.
    Done,

    /// Terminal: the stop signal was observed.
    Stopped,
}

/// How a worker run ended.
///
/// A worker that exhausts its iteration budget without finishing evaluation
/// ends in [`RunOutcome::Done`] as well; completion proper is observable only
/// through the [`DataStore::save_finished_to_store`] side effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The worker ran to the end, by finishing evaluation or by exhausting
    /// its iteration budget.
    Done,

    /// The worker halted on the stop signal.
    Stopped,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Polls the trainer's checkpoints and evaluates the restored model.
///
/// # Worker loop
///
/// ```mermaid
/// graph TD
///     A[AwaitingFirstCheckpoint] --> B[AwaitingTrainerReady]
///     B --> C[Iterating]
///     C --> D[Evaluating]
///     D -->|finished| F[Done]
///     D -->|sync mode| E[AwaitingNewerCheckpoint]
///     E --> C
///     D -->|async mode| C
///     C -->|budget exhausted| F
///     C -->|stop signal| G[Stopped]
///     E -->|stop signal| G
/// ```
///
/// After the two startup barriers, the worker builds the computation graph,
/// enters the train phase through a scoped [`PhaseContext`] and runs up to
/// `iterations` adoption cycles, where
/// `iterations = ceil(improve_steps / ceil(consecutive_playing_steps / num_workers))`.
/// The bound keeps a worker with no stop signal from looping forever when the
/// trainer stalls.
///
/// Each iteration checks the stop signal, evaluates the model, and then
/// synchronizes on the ledger according to the algorithm's [`SyncMode`]:
///
/// * **Sync**: block until a checkpoint newer than the last one seen is
///   published, pulling from the data store each poll, then restore it. The
///   worker never evaluates two iterations on the same checkpoint and never
///   skips ahead of the trainer's production rate.
/// * **Async**: never block; restore the newest checkpoint if one arrived,
///   otherwise keep evaluating the stale model. Staleness and skipped
///   checkpoints are accepted for throughput.
///
/// Errors from evaluation or checkpoint restoration are not caught here:
/// they propagate as fatal worker failure, and restarting the process is the
/// orchestrator's job.
pub struct EvalWorker<G, D>
where
    G: GraphManager,
    D: DataStore,
{
    /// Task parameters, holding the checkpoint directory.
    task_parameters: TaskParameters,

    /// Number of worker processes sharing the playing-step budget.
    num_workers: usize,

    /// Gate used for the startup barriers and sync-mode waits.
    gate: SyncGate,

    /// Current state of the worker.
    state: WorkerState,

    phantom: PhantomData<(G, D)>,
}

/// Number of checkpoint-adoption cycles a worker attempts before giving up.
///
/// A worker count of zero is treated as one.
fn iterations(improve_steps: usize, consecutive_playing_steps: usize, num_workers: usize) -> usize {
    let act_steps = ceil_div(consecutive_playing_steps, num_workers.max(1)).max(1);
    ceil_div(improve_steps, act_steps)
}

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

impl<G, D> EvalWorker<G, D>
where
    G: GraphManager,
    D: DataStore,
{
    /// Builds an [`EvalWorker`].
    ///
    /// A worker count of zero is treated as one.
    pub fn build(config: EvalWorkerConfig, task_parameters: TaskParameters) -> Self {
        Self {
            task_parameters,
            num_workers: config.num_workers.max(1),
            gate: SyncGate::new(config.poll_interval()),
            state: WorkerState::AwaitingFirstCheckpoint,
            phantom: PhantomData,
        }
    }

    /// Current state of the worker.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn transition(&mut self, next: WorkerState) {
        if self.state != next {
            info!("Evaluation worker: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    fn stopped(&mut self) -> Result<RunOutcome> {
        self.transition(WorkerState::Stopped);
        Ok(RunOutcome::Stopped)
    }

    /// Runs the worker to a terminal state.
    ///
    /// Blocks until evaluation finishes, the iteration budget is exhausted,
    /// or the stop signal is observed.
    pub fn run<S>(
        &mut self,
        graph_manager: &mut G,
        data_store: &mut D,
        stop: &S,
    ) -> Result<RunOutcome>
    where
        S: StopSignal,
    {
        let checkpoint_dir = self.task_parameters.checkpoint_dir.clone();

        // Startup barriers: a checkpoint must exist and the trainer must be
        // ready before the bounded loop may start.
        self.transition(WorkerState::AwaitingFirstCheckpoint);
        if wait_for_checkpoint(&checkpoint_dir, data_store, &self.gate, stop)?
            == WaitOutcome::Stopped
        {
            return self.stopped();
        }
        self.transition(WorkerState::AwaitingTrainerReady);
        if wait_for_trainer_ready(&checkpoint_dir, data_store, &self.gate, stop)?
            == WaitOutcome::Stopped
        {
            return self.stopped();
        }

        graph_manager.create_graph(&self.task_parameters)?;
        let mut graph_manager = PhaseContext::enter(graph_manager, RunPhase::Train);

        let reader = CheckpointStateReader::new(&checkpoint_dir, false)?;
        let mut last_adopted = match reader.get_latest()? {
            Some(c) => c.num,
            None => return Err(RolloutError::NoCheckpoint(checkpoint_dir).into()),
        };

        let mode = graph_manager.algorithm().synchronization;
        let evaluation_steps = graph_manager.evaluation_steps();
        let iterations = iterations(
            graph_manager.improve_steps(),
            graph_manager.algorithm().consecutive_playing_steps,
            self.num_workers,
        );
        info!(
            "Starts evaluation of checkpoint {} for up to {} iterations ({:?} mode)",
            last_adopted, iterations, mode
        );

        self.transition(WorkerState::Iterating);
        for _ in 0..iterations {
            if stop.should_stop() {
                return self.stopped();
            }

            self.transition(WorkerState::Evaluating);
            if graph_manager.evaluate(evaluation_steps)? {
                info!("Evaluation finished, publishing completion");
                data_store.save_finished_to_store()?;
                self.transition(WorkerState::Done);
                return Ok(RunOutcome::Done);
            }

            let mut candidate = reader.get_latest()?;
            match mode {
                SyncMode::Sync => {
                    self.transition(WorkerState::AwaitingNewerCheckpoint);
                    let outcome = self.gate.wait_until(
                        stop,
                        || data_store.load_from_store(),
                        || {
                            candidate = reader.get_latest()?;
                            Ok(match candidate {
                                Some(c) => c.num >= last_adopted + 1,
                                None => false,
                            })
                        },
                    )?;
                    if outcome == WaitOutcome::Stopped {
                        return self.stopped();
                    }
                    graph_manager.restore_checkpoint()?;
                }
                SyncMode::Async => {
                    if let Some(c) = candidate {
                        if c.num > last_adopted {
                            graph_manager.restore_checkpoint()?;
                        }
                    }
                }
            }

            // Tracks the highest checkpoint *seen*, not the highest adopted:
            // in async mode this advances even when no restore happened, so
            // an observed-but-stale candidate is never re-examined.
            if let Some(c) = candidate {
                last_adopted = c.num;
            }
            self.transition(WorkerState::Iterating);
        }

        info!("Iteration budget exhausted");
        self.transition(WorkerState::Done);
        Ok(RunOutcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_core::{AlgorithmConfig, Checkpoint, CheckpointLedger, SyncMarker};
    use std::sync::{Arc, Mutex};
    use tempdir::TempDir;
    use test_log::test;

    struct FakeGraph {
        improve_steps: usize,
        evaluation_steps: usize,
        algorithm: AlgorithmConfig,
        /// `evaluate` returns `true` on this call, counting from 1.
        finish_on: Option<usize>,
        /// Checkpoints published into this ledger after each `evaluate` call.
        publish_to: Option<(CheckpointLedger, u64)>,
        evaluations: usize,
        restores: usize,
        phases: Vec<RunPhase>,
    }

    impl FakeGraph {
        fn new(improve_steps: usize, algorithm: AlgorithmConfig) -> Self {
            Self {
                improve_steps,
                evaluation_steps: 1,
                algorithm,
                finish_on: None,
                publish_to: None,
                evaluations: 0,
                restores: 0,
                phases: vec![],
            }
        }
    }

    impl GraphManager for FakeGraph {
        fn create_graph(&mut self, _task_parameters: &TaskParameters) -> Result<()> {
            Ok(())
        }

        fn evaluate(&mut self, _steps: usize) -> Result<bool> {
            self.evaluations += 1;
            if let Some((ledger, next)) = &mut self.publish_to {
                ledger.append(*next)?;
                *next += 1;
            }
            Ok(self.finish_on == Some(self.evaluations))
        }

        fn restore_checkpoint(&mut self) -> Result<()> {
            self.restores += 1;
            Ok(())
        }

        fn set_phase(&mut self, phase: RunPhase) {
            self.phases.push(phase);
        }

        fn improve_steps(&self) -> usize {
            self.improve_steps
        }

        fn evaluation_steps(&self) -> usize {
            self.evaluation_steps
        }

        fn algorithm(&self) -> &AlgorithmConfig {
            &self.algorithm
        }
    }

    struct FakeStore {
        /// Checkpoint published into this ledger on each pull.
        publish_on_pull: Option<(CheckpointLedger, u64)>,
        loads: usize,
        saves: usize,
    }

    impl FakeStore {
        fn new() -> Self {
            Self {
                publish_on_pull: None,
                loads: 0,
                saves: 0,
            }
        }
    }

    impl DataStore for FakeStore {
        fn load_from_store(&mut self) -> Result<()> {
            self.loads += 1;
            if let Some((ledger, next)) = &mut self.publish_on_pull {
                ledger.append(*next)?;
                *next += 1;
            }
            Ok(())
        }

        fn save_finished_to_store(&mut self) -> Result<()> {
            self.saves += 1;
            Ok(())
        }
    }

    /// Checkpoint 1 published, trainer ready.
    fn ready_dir() -> Result<TempDir> {
        let dir = TempDir::new("eval_worker")?;
        CheckpointLedger::new(dir.path())?.append(1)?;
        SyncMarker::TrainerReady.touch(dir.path())?;
        Ok(dir)
    }

    fn worker(dir: &TempDir, num_workers: usize) -> EvalWorker<FakeGraph, FakeStore> {
        let config = EvalWorkerConfig::default()
            .num_workers(num_workers)
            .poll_interval_ms(1);
        EvalWorker::build(config, TaskParameters::new(dir.path()))
    }

    #[test]
    fn iteration_budget_arithmetic() {
        assert_eq!(iterations(100, 10, 5), 50);
        assert_eq!(iterations(100, 10, 3), 25);
        assert_eq!(iterations(1, 1, 1), 1);
        // Degenerate playing-step budget and worker count still yield a bound
        assert_eq!(iterations(10, 0, 4), 10);
        assert_eq!(iterations(10, 4, 0), 3);
        assert_eq!(iterations(10, 0, 0), 10);
    }

    #[test]
    fn zero_worker_count_is_treated_as_one() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default().synchronization(SyncMode::Async);
        let mut graph = FakeGraph::new(3, algorithm);
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(false));

        let mut worker = worker(&dir, 0);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;

        assert_eq!(outcome, RunOutcome::Done);
        assert_eq!(graph.evaluations, 3);
        Ok(())
    }

    #[test]
    fn stop_before_first_iteration_evaluates_nothing() -> Result<()> {
        let dir = ready_dir()?;
        let mut graph = FakeGraph::new(100, AlgorithmConfig::default());
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(true));

        let mut worker = worker(&dir, 1);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;

        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(graph.evaluations, 0);
        assert_eq!(graph.restores, 0);
        Ok(())
    }

    #[test]
    fn finishing_saves_to_store_once_and_halts() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default()
            .consecutive_playing_steps(10)
            .synchronization(SyncMode::Async);
        let mut graph = FakeGraph::new(100, algorithm);
        graph.finish_on = Some(3);
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(false));

        // 50 iterations available, finished on the third
        let mut worker = worker(&dir, 5);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;

        assert_eq!(outcome, RunOutcome::Done);
        assert_eq!(worker.state(), WorkerState::Done);
        assert_eq!(graph.evaluations, 3);
        assert_eq!(store.saves, 1);
        Ok(())
    }

    #[test]
    fn async_mode_makes_progress_without_new_checkpoints() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default().synchronization(SyncMode::Async);
        let mut graph = FakeGraph::new(5, algorithm);
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(false));

        let mut worker = worker(&dir, 1);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;

        // Exhausts all 5 iterations on the stale checkpoint, never blocking
        // and never restoring.
        assert_eq!(outcome, RunOutcome::Done);
        assert_eq!(graph.evaluations, 5);
        assert_eq!(graph.restores, 0);
        Ok(())
    }

    #[test]
    fn async_mode_adopts_newer_checkpoints_when_present() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default().synchronization(SyncMode::Async);
        let mut graph = FakeGraph::new(4, algorithm);
        graph.publish_to = Some((CheckpointLedger::new(dir.path())?, 2));
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(false));

        let mut worker = worker(&dir, 1);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;

        // Each evaluation publishes one checkpoint, so every iteration sees
        // a newer candidate and adopts it.
        assert_eq!(outcome, RunOutcome::Done);
        assert_eq!(graph.evaluations, 4);
        assert_eq!(graph.restores, 4);
        Ok(())
    }

    #[test]
    fn sync_mode_adopts_each_checkpoint_exactly_once() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default().synchronization(SyncMode::Sync);
        let mut graph = FakeGraph::new(3, algorithm);
        let mut store = FakeStore::new();
        // Each remote pull delivers exactly the next checkpoint.
        store.publish_on_pull = Some((CheckpointLedger::new(dir.path())?, 2));
        let stop = Arc::new(Mutex::new(false));

        let mut worker = worker(&dir, 1);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;

        // One restore per iteration, in lockstep with the trainer. The two
        // startup barriers and the three sync waits each pull exactly once,
        // so checkpoints 2..=6 are published in total.
        assert_eq!(outcome, RunOutcome::Done);
        assert_eq!(graph.evaluations, 3);
        assert_eq!(graph.restores, 3);
        assert_eq!(store.loads, 5);
        assert_eq!(
            CheckpointLedger::new(dir.path())?.latest()?,
            Some(Checkpoint::new(6))
        );
        Ok(())
    }

    #[test]
    fn sync_mode_stop_during_wait_halts_the_worker() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default().synchronization(SyncMode::Sync);
        let mut graph = FakeGraph::new(100, algorithm);
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(false));

        let setter = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(20));
                *stop.lock().unwrap() = true;
            })
        };

        // No new checkpoint ever arrives; the first sync wait blocks until
        // the stop signal fires.
        let mut worker = worker(&dir, 1);
        let outcome = worker.run(&mut graph, &mut store, &stop)?;
        setter.join().unwrap();

        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert_eq!(graph.evaluations, 1);
        assert_eq!(graph.restores, 0);
        Ok(())
    }

    #[test]
    fn phase_is_train_during_the_loop_and_reset_after() -> Result<()> {
        let dir = ready_dir()?;
        let algorithm = AlgorithmConfig::default().synchronization(SyncMode::Async);
        let mut graph = FakeGraph::new(2, algorithm);
        let mut store = FakeStore::new();
        let stop = Arc::new(Mutex::new(false));

        worker(&dir, 1).run(&mut graph, &mut store, &stop)?;

        assert_eq!(graph.phases, vec![RunPhase::Train, RunPhase::Undefined]);
        Ok(())
    }
}

#![warn(missing_docs)]
//! Evaluation worker for distributed reinforcement learning.
//!
//! A worker process running this crate:
//!
//! * waits for a trainer to publish its first checkpoint and signal readiness,
//! * restores the latest model and evaluates it,
//! * synchronizes on newly published checkpoints (blocking in sync mode,
//!   best-effort in async mode),
//! * reports completion to the data store and exits.
//!
//! The model/environment stack and the remote checkpoint store are consumed
//! through the [`GraphManager`](rollout_core::GraphManager) and
//! [`DataStore`](rollout_core::DataStore) interfaces of `rollout-core`.
mod eval_worker;
mod util;
pub use eval_worker::{EvalWorker, EvalWorkerConfig, RunOutcome, WorkerState};
pub use util::{wait_for_checkpoint, wait_for_trainer_ready};

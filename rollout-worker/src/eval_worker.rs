//! The evaluation worker state machine.
mod base;
mod config;
pub use base::{EvalWorker, RunOutcome, WorkerState};
pub use config::EvalWorkerConfig;

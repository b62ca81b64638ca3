#![warn(missing_docs)]
//! Core abstractions for checkpoint-synchronized evaluation in distributed
//! reinforcement learning.
//!
//! A trainer process publishes numbered checkpoints into a shared checkpoint
//! directory; evaluation worker processes poll that directory, restore the
//! latest model, and run evaluation episodes. This crate provides the pieces
//! shared by both sides of that protocol:
//!
//! * [`CheckpointLedger`] — durable, append-only record of published
//!   checkpoint numbers.
//! * [`CheckpointStateReader`] — read-only view over a checkpoint directory.
//! * [`SyncGate`] — blocking wait primitive polling the ledger until a
//!   condition holds.
//! * [`StopSignal`] — cooperative cancellation flag polled by every blocking
//!   wait.
//! * [`SyncMarker`] — well-known marker files coordinating trainer and
//!   workers.
//! * [`GraphManager`] and [`DataStore`] — the consumed interfaces of the
//!   model/environment stack and the remote checkpoint store.
pub mod error;

mod base;
pub use base::{DataStore, GraphManager, PhaseContext, RunPhase};

mod checkpoint;
pub use checkpoint::{Checkpoint, CheckpointLedger, CheckpointStateReader};

mod config;
pub use config::{AlgorithmConfig, SyncMode, TaskParameters};

mod marker;
pub use marker::SyncMarker;

mod stop;
pub use stop::{MarkerStopSignal, StopSignal};

mod sync_gate;
pub use sync_gate::{SyncGate, WaitOutcome};

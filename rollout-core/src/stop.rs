//! Cooperative termination signal.
use crate::marker::SyncMarker;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// External, read-only cancellation flag.
///
/// Polled at the top of every worker iteration and inside every blocking
/// wait. The worker never sets or clears the signal; it only observes it.
/// There is no debounce: a single `true` reading halts new evaluation and
/// adoption, though any step already in flight completes.
pub trait StopSignal {
    /// Whether the worker should stop.
    fn should_stop(&self) -> bool;
}

/// Stop signal keyed by a checkpoint directory.
///
/// Reads the [`SyncMarker::Finished`] marker the trainer places when training
/// ends.
pub struct MarkerStopSignal {
    checkpoint_dir: PathBuf,
}

impl MarkerStopSignal {
    /// Creates a stop signal observing the given checkpoint directory.
    pub fn new(checkpoint_dir: impl AsRef<Path>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.as_ref().to_path_buf(),
        }
    }
}

impl StopSignal for MarkerStopSignal {
    fn should_stop(&self) -> bool {
        SyncMarker::Finished.is_set(&self.checkpoint_dir)
    }
}

/// Shared in-process stop flag.
impl StopSignal for Arc<Mutex<bool>> {
    fn should_stop(&self) -> bool {
        *self.lock().unwrap()
    }
}

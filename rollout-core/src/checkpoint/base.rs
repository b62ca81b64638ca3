//! Checkpoint identity.
use serde::{Deserialize, Serialize};

/// A numbered, immutable snapshot of trainable model state.
///
/// The payload itself is opaque to the synchronization protocol; restoring it
/// is the job of the graph manager. Identity is the number: the trainer
/// assigns strictly increasing numbers, and a checkpoint is never mutated
/// once written, only superseded by a higher-numbered one.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint {
    /// Monotonically increasing checkpoint number.
    pub num: u64,
}

impl Checkpoint {
    /// Creates a checkpoint identity with the given number.
    pub fn new(num: u64) -> Self {
        Self { num }
    }
}

//! Read-only view over the checkpoint state of a directory.
use super::{Checkpoint, CheckpointLedger};
use crate::error::RolloutError;
use anyhow::Result;
use std::path::Path;

/// Reads checkpoint state from a checkpoint directory.
///
/// This is the worker-side handle: it never appends. When constructed with
/// `checkpoint_state_optional == false`, an empty ledger is a fatal
/// construction error rather than something to poll for, so a coordinator
/// that requires a checkpoint fails loudly instead of looping forever.
#[derive(Debug)]
pub struct CheckpointStateReader {
    ledger: CheckpointLedger,
}

impl CheckpointStateReader {
    /// Creates a reader over the given checkpoint directory.
    ///
    /// Fails with [`RolloutError::NoCheckpoint`] if
    /// `checkpoint_state_optional` is `false` and no checkpoint has been
    /// published yet.
    pub fn new(dir: impl AsRef<Path>, checkpoint_state_optional: bool) -> Result<Self> {
        let ledger = CheckpointLedger::new(dir.as_ref())?;
        if !checkpoint_state_optional && ledger.is_empty()? {
            return Err(RolloutError::NoCheckpoint(dir.as_ref().to_path_buf()).into());
        }
        Ok(Self { ledger })
    }

    /// Returns the highest-numbered published checkpoint, if any.
    pub fn get_latest(&self) -> Result<Option<Checkpoint>> {
        self.ledger.latest()
    }

    /// The checkpoint directory this reader observes.
    pub fn dir(&self) -> &Path {
        self.ledger.dir()
    }
}

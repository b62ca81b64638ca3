//! Startup wait barriers.
use anyhow::Result;
use rollout_core::{CheckpointLedger, DataStore, StopSignal, SyncGate, SyncMarker, WaitOutcome};
use std::path::Path;

/// Blocks until the trainer has published its first checkpoint.
///
/// Pulls from the data store each poll. Returns [`WaitOutcome::Stopped`] if
/// the stop signal fires first.
pub fn wait_for_checkpoint<D, S>(
    checkpoint_dir: impl AsRef<Path>,
    data_store: &mut D,
    gate: &SyncGate,
    stop: &S,
) -> Result<WaitOutcome>
where
    D: DataStore,
    S: StopSignal,
{
    let ledger = CheckpointLedger::new(checkpoint_dir.as_ref())?;
    gate.wait_until(
        stop,
        || data_store.load_from_store(),
        || Ok(!ledger.is_empty()?),
    )
}

/// Blocks until the trainer has set the trainer-ready marker.
///
/// Pulls from the data store each poll. Returns [`WaitOutcome::Stopped`] if
/// the stop signal fires first.
pub fn wait_for_trainer_ready<D, S>(
    checkpoint_dir: impl AsRef<Path>,
    data_store: &mut D,
    gate: &SyncGate,
    stop: &S,
) -> Result<WaitOutcome>
where
    D: DataStore,
    S: StopSignal,
{
    let dir = checkpoint_dir.as_ref().to_path_buf();
    gate.wait_until(
        stop,
        || data_store.load_from_store(),
        || Ok(SyncMarker::TrainerReady.is_set(&dir)),
    )
}

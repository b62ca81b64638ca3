//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum RolloutError {
    /// An appended checkpoint number did not follow the ledger head.
    #[error("checkpoint {attempted} does not follow ledger head {head}")]
    OrderViolation {
        /// The highest checkpoint number currently in the ledger.
        head: u64,
        /// The number whose append was rejected.
        attempted: u64,
    },

    /// A checkpoint number was requested that was never appended.
    #[error("checkpoint {0} not found in ledger")]
    CheckpointNotFound(u64),

    /// No checkpoint is available in the checkpoint directory.
    #[error("no checkpoint available in {0:?}")]
    NoCheckpoint(PathBuf),
}

//! Checkpoint identity and the on-disk checkpoint ledger.
mod base;
mod ledger;
mod reader;
pub use base::Checkpoint;
pub use ledger::CheckpointLedger;
pub use reader::CheckpointStateReader;

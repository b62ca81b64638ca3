//! Configuration shared between the trainer and evaluation workers.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Consistency mode of checkpoint adoption in distributed training.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum SyncMode {
    /// The worker blocks until it has adopted each new checkpoint in order.
    Sync,

    /// The worker adopts the newest available checkpoint without blocking,
    /// tolerating staleness or skipped checkpoints.
    Async,
}

/// Algorithm-level configuration consumed by evaluation workers.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct AlgorithmConfig {
    /// Playing steps taken per checkpoint across all workers.
    pub consecutive_playing_steps: usize,

    /// How workers synchronize on newly published checkpoints.
    pub synchronization: SyncMode,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            consecutive_playing_steps: 1,
            synchronization: SyncMode::Sync,
        }
    }
}

impl AlgorithmConfig {
    /// Sets the playing steps taken per checkpoint.
    pub fn consecutive_playing_steps(mut self, v: usize) -> Self {
        self.consecutive_playing_steps = v;
        self
    }

    /// Sets the checkpoint synchronization mode.
    pub fn synchronization(mut self, v: SyncMode) -> Self {
        self.synchronization = v;
        self
    }

    /// Constructs [`AlgorithmConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`AlgorithmConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Parameters a worker process is invoked with.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TaskParameters {
    /// Directory holding the checkpoint ledger and sync markers.
    pub checkpoint_dir: PathBuf,
}

impl TaskParameters {
    /// Creates task parameters for the given checkpoint directory.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
        }
    }

    /// Constructs [`TaskParameters`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TaskParameters`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

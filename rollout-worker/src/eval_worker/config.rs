//! Configuration of [`EvalWorker`](super::EvalWorker).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// Configuration of [`EvalWorker`](super::EvalWorker).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EvalWorkerConfig {
    /// Number of evaluation worker processes sharing the playing-step budget.
    ///
    /// Zero is treated as one by [`EvalWorker::build`](super::EvalWorker::build).
    pub num_workers: usize,

    /// Interval between ledger polls while waiting, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for EvalWorkerConfig {
    fn default() -> Self {
        Self {
            num_workers: 1,
            poll_interval_ms: 1000,
        }
    }
}

impl EvalWorkerConfig {
    /// Sets the number of worker processes.
    pub fn num_workers(mut self, v: usize) -> Self {
        self.num_workers = v;
        self
    }

    /// Sets the poll interval in milliseconds.
    pub fn poll_interval_ms(mut self, v: u64) -> Self {
        self.poll_interval_ms = v;
        self
    }

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Constructs [`EvalWorkerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EvalWorkerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn config_roundtrip() -> Result<()> {
        let config = EvalWorkerConfig::default()
            .num_workers(5)
            .poll_interval_ms(250);

        let dir = TempDir::new("eval_worker_config")?;
        let path = dir.path().join("eval_worker.yaml");
        config.save(&path)?;
        let config_ = EvalWorkerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}

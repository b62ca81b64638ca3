//! Durable, append-only ledger of published checkpoint numbers.
use super::Checkpoint;
use crate::error::RolloutError;
use anyhow::{Context, Result};
use log::info;
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

/// File name of the ledger inside a checkpoint directory.
const LEDGER_FILE: &str = "checkpoints.ledger";

/// Append-only record of checkpoint numbers in a checkpoint directory.
///
/// The trainer process appends; an arbitrary number of worker processes read.
/// Entries are one decimal checkpoint number per line. Every append rewrites
/// the ledger to a temporary file, flushes it to disk and atomically renames
/// it over the old one, so a concurrent reader parses either the previous
/// complete ledger or the new complete ledger, never a partial write.
///
/// The ledger holds no cached state: every read goes back to the file and
/// returns a snapshot by value.
#[derive(Debug)]
pub struct CheckpointLedger {
    dir: PathBuf,
}

impl CheckpointLedger {
    /// Creates a ledger handle for the given checkpoint directory.
    ///
    /// The directory is created if it does not exist. An absent ledger file
    /// is an empty ledger, not an error.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create checkpoint directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    /// The checkpoint directory this ledger lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends a checkpoint number.
    ///
    /// Fails with [`RolloutError::OrderViolation`] if `num` does not exceed
    /// the current head. On `Ok` the entry is durable: it survives a crash of
    /// the writer process.
    pub fn append(&self, num: u64) -> Result<()> {
        let mut nums = self.read_numbers()?;
        if let Some(&head) = nums.last() {
            if num <= head {
                return Err(RolloutError::OrderViolation {
                    head,
                    attempted: num,
                }
                .into());
            }
        }
        nums.push(num);

        let tmp = self.dir.join(format!(".{}.tmp", LEDGER_FILE));
        let path = self.dir.join(LEDGER_FILE);
        let mut file = File::create(&tmp)
            .with_context(|| format!("Failed to create ledger temp file {:?}", &tmp))?;
        for n in &nums {
            writeln!(file, "{}", n)?;
        }
        file.sync_all()?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to publish ledger {:?}", &path))?;
        // The rename must reach disk too, not just the file contents.
        #[cfg(unix)]
        File::open(&self.dir)?.sync_all()?;
        info!("Published checkpoint {} in {:?}", num, self.dir);
        Ok(())
    }

    /// Returns the highest-numbered checkpoint, or `None` while the ledger is
    /// empty. Never blocks.
    pub fn latest(&self) -> Result<Option<Checkpoint>> {
        let nums = self.read_numbers()?;
        Ok(nums.last().map(|&num| Checkpoint::new(num)))
    }

    /// Returns the checkpoint with the given number.
    ///
    /// Fails with [`RolloutError::CheckpointNotFound`] if the number was
    /// never appended.
    pub fn get(&self, num: u64) -> Result<Checkpoint> {
        let nums = self.read_numbers()?;
        if nums.binary_search(&num).is_ok() {
            Ok(Checkpoint::new(num))
        } else {
            Err(RolloutError::CheckpointNotFound(num).into())
        }
    }

    /// Number of entries in the ledger.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_numbers()?.len())
    }

    /// Whether the ledger has no entries yet.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_numbers()?.is_empty())
    }

    fn read_numbers(&self) -> Result<Vec<u64>> {
        let path = self.dir.join(LEDGER_FILE);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to open ledger {:?}", &path)))
            }
        };
        let rdr = BufReader::new(file);
        let mut nums = vec![];
        for line in rdr.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let num = line
                .parse::<u64>()
                .with_context(|| format!("Corrupt ledger entry {:?} in {:?}", line, &path))?;
            nums.push(num);
        }
        Ok(nums)
    }
}

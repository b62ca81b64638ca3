//! Well-known marker files coordinating trainer and workers.
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Marker files placed in the checkpoint directory.
///
/// The trainer and the workers never talk to each other directly; they
/// coordinate through the presence of these files. Markers are empty: the
/// file existing is the whole signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMarker {
    /// Training has finished; workers should stop.
    Finished,

    /// The trainer has restored/initialized and checkpoints are trustworthy.
    TrainerReady,
}

impl SyncMarker {
    /// File name of this marker inside the checkpoint directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            SyncMarker::Finished => ".finished",
            SyncMarker::TrainerReady => ".ready",
        }
    }

    /// Whether this marker is set in `dir`.
    pub fn is_set(&self, dir: impl AsRef<Path>) -> bool {
        dir.as_ref().join(self.file_name()).exists()
    }

    /// Sets this marker in `dir`.
    pub fn touch(&self, dir: impl AsRef<Path>) -> Result<()> {
        let path = dir.as_ref().join(self.file_name());
        fs::File::create(&path)
            .with_context(|| format!("Failed to set marker {:?}", &path))?;
        Ok(())
    }

    /// Clears this marker in `dir`. Clearing an absent marker is a no-op.
    pub fn clear(&self, dir: impl AsRef<Path>) -> Result<()> {
        let path = dir.as_ref().join(self.file_name());
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(anyhow::Error::new(e).context(format!("Failed to clear marker {:?}", &path)))
            }
        }
    }
}

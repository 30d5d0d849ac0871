//! File-backed checkpoints
//!
//! One bincode file per checkpoint, `state-<round>.bin`, written to a temp
//! file, synced and renamed into place.

use crate::domain::{PlatformState, StateError, StateResult};
use crate::ports::outbound::StateStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct FileStateStore {
    directory: PathBuf,
    retained: usize,
}

impl FileStateStore {
    pub fn new(directory: impl Into<PathBuf>, retained: usize) -> StateResult<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self {
            directory,
            retained: retained.max(1),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, round: u64) -> PathBuf {
        self.directory.join(format!("state-{round:010}.bin"))
    }

    /// Checkpoint files, oldest first.
    fn checkpoints(&self) -> StateResult<Vec<(u64, PathBuf)>> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name();
            let round = name
                .to_str()
                .and_then(|n| n.strip_prefix("state-"))
                .and_then(|n| n.strip_suffix(".bin"))
                .and_then(|n| n.parse::<u64>().ok());
            if let Some(round) = round {
                found.push((round, entry.path()));
            }
        }
        found.sort_by_key(|(round, _)| *round);
        Ok(found)
    }

    fn remove_old(&self) -> StateResult<()> {
        let checkpoints = self.checkpoints()?;
        let excess = checkpoints.len().saturating_sub(self.retained);
        for (round, path) in checkpoints.into_iter().take(excess) {
            std::fs::remove_file(&path)?;
            debug!(round, "Removed old checkpoint");
        }
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn save(&self, state: &PlatformState) -> StateResult<()> {
        let bytes = bincode::serialize(state).map_err(|e| StateError::Codec(e.to_string()))?;
        let path = self.path_for(state.round);
        let temp_path = path.with_extension("tmp");

        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &path)?;

        debug!(round = state.round, bytes = bytes.len(), "Checkpoint saved");
        self.remove_old()
    }

    fn load_latest(&self) -> StateResult<Option<PlatformState>> {
        for (round, path) in self.checkpoints()?.into_iter().rev() {
            let bytes = std::fs::read(&path)?;
            match bincode::deserialize::<PlatformState>(&bytes) {
                Ok(state) => return Ok(Some(state)),
                Err(e) => warn!(round, error = %e, "Skipping unreadable checkpoint"),
            }
        }
        Ok(None)
    }
}

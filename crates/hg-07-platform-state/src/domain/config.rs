//! Platform state configuration

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateConfig {
    /// Save a checkpoint every this many rounds.
    pub checkpoint_interval: u64,
    /// Checkpoints kept on disk.
    pub retained_checkpoints: usize,
    pub directory: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: 5,
            retained_checkpoints: 3,
            directory: PathBuf::from("data/state"),
        }
    }
}

//! PCES configuration

use std::path::PathBuf;

/// Preconsensus event stream configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcesConfig {
    /// Directory holding the segment files.
    pub directory: PathBuf,
    /// A segment is closed once it grows past this size.
    pub max_segment_bytes: u64,
    /// Write buffer size before data reaches the file.
    pub write_buffer_bytes: usize,
}

impl Default for PcesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/pces"),
            max_segment_bytes: 64 * 1024 * 1024,
            write_buffer_bytes: 64 * 1024,
        }
    }
}

impl PcesConfig {
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }
}

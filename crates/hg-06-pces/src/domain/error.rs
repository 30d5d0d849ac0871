//! Error types for the Preconsensus Event Stream

use std::path::PathBuf;

/// PCES error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PcesError {
    #[error("PCES I/O error: {message}")]
    Io { message: String },

    #[error("Corrupt record in {segment} at offset {offset}")]
    Corrupt { segment: String, offset: u64 },

    #[error("PCES directory already locked: {0}")]
    Locked(PathBuf),

    #[error("Event encoding failed: {0}")]
    Codec(String),

    #[error("Record of {0} bytes exceeds the maximum record size")]
    RecordTooLarge(usize),
}

impl From<std::io::Error> for PcesError {
    fn from(e: std::io::Error) -> Self {
        PcesError::Io {
            message: e.to_string(),
        }
    }
}

/// Result type for PCES operations
pub type PcesResult<T> = Result<T, PcesError>;

//! Error types for Platform State

/// Platform state error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Round {round} does not follow state round {current}")]
    RoundRegression { round: u64, current: u64 },

    #[error("Round {round} skips rounds after state round {current}")]
    RoundGap { round: u64, current: u64 },

    /// The round was applied and published but its checkpoint is missing.
    #[error("Checkpoint of round {round} failed: {message}")]
    CheckpointFailed { round: u64, message: String },

    #[error("State I/O error: {message}")]
    Io { message: String },

    #[error("State encoding failed: {0}")]
    Codec(String),
}

impl From<std::io::Error> for StateError {
    fn from(e: std::io::Error) -> Self {
        StateError::Io {
            message: e.to_string(),
        }
    }
}

/// Result type for platform state operations
pub type StateResult<T> = Result<T, StateError>;

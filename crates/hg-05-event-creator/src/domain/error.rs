//! Error types for the Event Creator

/// Event creator error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreatorError {
    #[error("Transaction payload is empty")]
    EmptyTransaction,

    #[error("Transaction of {size} bytes exceeds the {max} byte limit")]
    TransactionTooLarge { size: usize, max: usize },

    #[error("Transaction pool is full")]
    PoolFull,

    /// Intake refused our own event.
    #[error("Self-event submission failed: {0}")]
    Submission(String),
}

/// Result type for event creator operations
pub type CreatorResult<T> = Result<T, CreatorError>;

//! Error types for Event Intake

use shared_types::{Hash, NodeId, Timestamp};

/// Why an event was rejected. The sender of such an event is penalised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Transaction {index} has an empty payload")]
    EmptyTransaction { index: usize },

    #[error("Event has {count} transactions, limit is {max}")]
    TooManyTransactions { count: usize, max: usize },

    #[error("Event has {bytes} transaction bytes, limit is {max}")]
    TooManyTransactionBytes { bytes: usize, max: usize },

    #[error("Both parents were created by {0}")]
    DuplicateParentCreator(NodeId),

    #[error("Self-parent created by {parent_creator}, event by {creator}")]
    ForeignSelfParent { creator: NodeId, parent_creator: NodeId },

    #[error("Other-parent created by the event creator {0}")]
    OtherParentIsSelf(NodeId),

    #[error("Birth round {birth_round} is below parent birth round {max_parent_birth_round}")]
    BirthRoundBelowParents {
        birth_round: u64,
        max_parent_birth_round: u64,
    },

    #[error("Parent descriptor does not match the known parent {0:?}")]
    ParentMismatch(Hash),

    #[error("Created at {time_created}, not after self-parent at {self_parent_time}")]
    TimeNotAfterSelfParent {
        time_created: Timestamp,
        self_parent_time: Timestamp,
    },

    #[error("Creator {0} is not in the roster")]
    UnknownCreator(NodeId),

    #[error("Parent creator {0} is not in the roster")]
    UnknownParentCreator(NodeId),

    #[error("Signature does not verify against the creator's key")]
    InvalidSignature,

    #[error("Rejected by consensus: {0}")]
    Rejected(String),
}

/// Event Intake error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] ValidationError),

    /// An event or a decided round could not be persisted. Intake halts.
    #[error("Durability failure: {0}")]
    DurabilityFailure(String),

    #[error("Intake halted after a durability failure")]
    Halted,
}

/// Result type for intake operations
pub type IntakeResult<T> = Result<T, IntakeError>;

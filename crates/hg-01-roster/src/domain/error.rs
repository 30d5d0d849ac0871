//! Error types for the Roster subsystem

use shared_types::NodeId;

/// Roster error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Roster has no members")]
    Empty,

    #[error("Duplicate roster entry for {0}")]
    DuplicateMember(NodeId),

    #[error("Roster total weight is zero")]
    ZeroWeight,

    #[error("Roster weight overflows u64")]
    WeightOverflow,

    #[error("Unknown roster member: {0}")]
    UnknownMember(NodeId),

    #[error("Roster transition at round {round} must follow round {previous}")]
    NonIncreasingTransition { round: u64, previous: u64 },

    #[error("No roster is effective for round {0}")]
    NoRosterForRound(u64),
}

/// Result type for roster operations
pub type RosterResult<T> = Result<T, RosterError>;

//! Error types for the Hashgraph subsystem

use hg_01_roster::RosterError;
use shared_types::{Hash, NodeId};

/// Hashgraph error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashgraphError {
    #[error("Event already in the hashgraph: {0:?}")]
    DuplicateEvent(Hash),

    #[error("Event creator {0} is not in the active roster")]
    UnknownCreator(NodeId),

    #[error("Event birth round {birth_round} is below ancient threshold {ancient_threshold}")]
    AncientEvent {
        birth_round: u64,
        ancient_threshold: u64,
    },

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

/// Result type for hashgraph operations
pub type HashgraphResult<T> = Result<T, HashgraphError>;

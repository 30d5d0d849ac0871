//! Error types for Gossip

use shared_types::NodeId;

/// Gossip error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GossipError {
    #[error("Sync with {peer} failed: {reason}")]
    PeerSyncFailure { peer: NodeId, reason: String },

    #[error("Sync with {0} timed out")]
    Timeout(NodeId),

    #[error("No peer available for sync")]
    NoPeers,

    #[error("Transport error: {0}")]
    Transport(String),

    /// Intake stopped accepting events.
    #[error("Intake rejected submission: {0}")]
    Intake(String),

    #[error("Gossip is shutting down")]
    Shutdown,
}

/// Result type for gossip operations
pub type GossipResult<T> = Result<T, GossipError>;

//! Driven Ports (SPI - Outbound)

use crate::domain::{IntakeResult, ValidationError};
use async_trait::async_trait;
use shared_types::{
    ConsensusRound, EventWindow, GossipEvent, Hash, NodeId, PlatformEvent, PublicKey, Signature,
};

/// Event signature check.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, public_key: &PublicKey, hash: &Hash, signature: &Signature) -> bool;
}

/// Write-ahead log of accepted events.
#[async_trait]
pub trait EventJournal: Send + Sync {
    /// Append and flush. The event is durable once this returns `Ok`.
    async fn append(&self, event: &GossipEvent) -> IntakeResult<()>;

    /// Events below the window's ancient threshold may be discarded.
    async fn advance_window(&self, window: EventWindow) -> IntakeResult<()>;
}

/// Receiver of decided rounds, in round order.
///
/// Implementations may await to apply backpressure on intake. An error means
/// the round could not be made durable and halts intake.
#[async_trait]
pub trait ConsensusObserver: Send + Sync {
    async fn on_round(&self, round: ConsensusRound) -> IntakeResult<()>;
}

/// Receiver of every inserted event and window change.
pub trait EventSink: Send + Sync {
    fn on_event_added(&self, event: &PlatformEvent);

    fn on_window(&self, window: EventWindow);
}

/// Reputation hook for peers that sent invalid events.
pub trait PeerPenalizer: Send + Sync {
    fn penalize(&self, peer: NodeId, reason: &ValidationError);
}

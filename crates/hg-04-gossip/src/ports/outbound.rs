//! Driven Ports (SPI - Outbound)

use crate::domain::{GossipResult, SyncRequest, SyncResponse};
use async_trait::async_trait;
use shared_types::{GossipEvent, NodeId};

/// Connection to the other members.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn sync(&self, peer: NodeId, request: SyncRequest) -> GossipResult<SyncResponse>;

    async fn push(
        &self,
        peer: NodeId,
        from: NodeId,
        events: Vec<GossipEvent>,
    ) -> GossipResult<()>;
}

/// Hands received events to intake.
#[async_trait]
pub trait EventSubmitter: Send + Sync {
    /// `Ok(true)` when the event was inserted, `Ok(false)` when it was a
    /// duplicate, orphan, ancient or invalid. Errors stop gossip.
    async fn submit(&self, event: GossipEvent, sender: NodeId) -> GossipResult<bool>;

    /// Called when this node falls behind the network or catches up again.
    fn report_fallen_behind(&self, fallen_behind: bool);
}

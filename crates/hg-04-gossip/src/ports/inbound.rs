//! Driving Ports (API - Inbound)
//!
//! Called by the transport when a peer initiates an exchange.

use crate::domain::{GossipResult, SyncRequest, SyncResponse};
use async_trait::async_trait;
use shared_types::{GossipEvent, NodeId};

#[async_trait]
pub trait GossipApi: Send + Sync {
    /// Answer a peer's sync: our summary and the events it lacks.
    async fn handle_sync(&self, request: SyncRequest) -> GossipResult<SyncResponse>;

    /// Events a peer pushed after a sync. Returns how many were accepted.
    async fn handle_push(&self, from: NodeId, events: Vec<GossipEvent>) -> GossipResult<usize>;
}

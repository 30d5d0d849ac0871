//! Driven Ports (SPI - Outbound)

use crate::domain::{CreationPressure, CreatorResult};
use async_trait::async_trait;
use shared_types::GossipEvent;

/// The local node's intake, seen from the creator.
#[async_trait]
pub trait CreatorIntake: Send + Sync {
    /// Submit a freshly signed self-event. Anything but insertion is an
    /// error.
    async fn submit(&self, event: GossipEvent) -> CreatorResult<()>;

    /// Current backlog and consensus lag.
    async fn pressure(&self) -> CreationPressure;
}

//! Driving Ports (API - Inbound)

use crate::domain::{IntakeOutcome, IntakeResult};
use async_trait::async_trait;
use shared_types::{EventWindow, GossipEvent, NodeId};

/// Event intake API, used by gossip, the event creator and PCES replay.
#[async_trait]
pub trait EventIntakeApi: Send + Sync {
    /// Run an event through the full pipeline. `sender` is `None` for
    /// self-created events.
    ///
    /// Errors only on durability failures; rejections are outcomes.
    async fn submit(
        &self,
        event: GossipEvent,
        sender: Option<NodeId>,
    ) -> IntakeResult<IntakeOutcome>;

    /// Insert an event read back from the journal without journaling it again.
    async fn replay(&self, event: GossipEvent) -> IntakeResult<IntakeOutcome>;

    async fn event_window(&self) -> EventWindow;

    fn is_halted(&self) -> bool;
}

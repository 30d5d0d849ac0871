//! Driving Ports (API - Inbound)

use crate::domain::CreatorResult;
use async_trait::async_trait;
use shared_types::EventDescriptor;

#[async_trait]
pub trait EventCreatorApi: Send + Sync {
    /// Queue an application transaction for a future event.
    fn submit_transaction(&self, transaction: Vec<u8>) -> CreatorResult<()>;

    /// Create and submit an event if the creation rules allow it now.
    async fn maybe_create(&self) -> CreatorResult<Option<EventDescriptor>>;

    fn pending_transactions(&self) -> usize;
}

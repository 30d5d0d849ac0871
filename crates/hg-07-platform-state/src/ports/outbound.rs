//! Driven Ports (SPI - Outbound)

use crate::domain::{PlatformState, StateResult};

/// Durable checkpoint storage.
pub trait StateStore: Send + Sync {
    /// Persist a checkpoint. Must be atomic: a crash leaves either the old or
    /// the new checkpoint, never a partial one.
    fn save(&self, state: &PlatformState) -> StateResult<()>;

    /// Most recent checkpoint, if any.
    fn load_latest(&self) -> StateResult<Option<PlatformState>>;
}

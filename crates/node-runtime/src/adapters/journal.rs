//! # PCES Journal Adapter
//!
//! Implements intake's `EventJournal` over `PcesWriter`. Every append is
//! flushed before intake lets the event reach the hashgraph.
//!
//! Pruning never passes the ancient threshold of the latest state
//! checkpoint, so a restart from that checkpoint still finds every event it
//! has to replay.

use hg_02_event_intake::{EventJournal, IntakeError, IntakeResult};
use hg_06_pces::PcesWriter;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{EventWindow, GossipEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Lowest ancient threshold any restart may still need.
#[derive(Debug, Clone)]
pub struct PruneFloor(Arc<AtomicU64>);

impl PruneFloor {
    pub fn new(threshold: u64) -> Self {
        Self(Arc::new(AtomicU64::new(threshold)))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn raise(&self, threshold: u64) {
        self.0.fetch_max(threshold, Ordering::SeqCst);
    }
}

pub struct PcesJournal {
    writer: Mutex<Option<PcesWriter>>,
    floor: PruneFloor,
}

impl PcesJournal {
    pub fn new(writer: PcesWriter, floor: PruneFloor) -> Self {
        Self {
            writer: Mutex::new(Some(writer)),
            floor,
        }
    }

    /// Release the writer and its directory lock. Later appends fail.
    pub fn close(&self) {
        if let Some(writer) = self.writer.lock().take() {
            info!(directory = %writer.directory().display(), "PCES journal closed");
        }
    }

    fn with_writer<T>(
        &self,
        f: impl FnOnce(&mut PcesWriter) -> hg_06_pces::PcesResult<T>,
    ) -> IntakeResult<T> {
        let mut guard = self.writer.lock();
        let writer = guard
            .as_mut()
            .ok_or_else(|| IntakeError::DurabilityFailure("journal closed".into()))?;
        f(writer).map_err(|e| IntakeError::DurabilityFailure(e.to_string()))
    }
}

#[async_trait]
impl EventJournal for PcesJournal {
    async fn append(&self, event: &GossipEvent) -> IntakeResult<()> {
        self.with_writer(|writer| {
            writer.append(event)?;
            writer.flush()
        })
    }

    async fn advance_window(&self, window: EventWindow) -> IntakeResult<()> {
        let threshold = window.ancient_threshold.min(self.floor.get());
        self.with_writer(|writer| writer.prune(threshold).map(|_| ()))
    }
}

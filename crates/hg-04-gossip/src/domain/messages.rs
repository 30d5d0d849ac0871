//! Sync wire messages

use serde::{Deserialize, Serialize};
use shared_types::{EventDescriptor, EventWindow, GossipEvent, NodeId};

/// What a node has: its tips and its event window.
///
/// A node that holds one of these tips knows the peer has the tip and every
/// ancestor of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Highest-generation events of every creator. A forked creator can
    /// have several.
    pub tips: Vec<EventDescriptor>,
    pub event_window: EventWindow,
}

impl SyncSummary {
    pub fn latest_round(&self) -> u64 {
        self.event_window.latest_consensus_round
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub from: NodeId,
    pub summary: SyncSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse {
    pub summary: SyncSummary,
    /// Events the requester lacks, parents before children.
    pub events: Vec<GossipEvent>,
}

/// Outcome of one completed sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub peer: NodeId,
    pub received: usize,
    pub accepted: usize,
    pub pushed: usize,
}

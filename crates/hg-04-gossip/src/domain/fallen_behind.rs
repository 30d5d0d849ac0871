//! Fallen-behind detection
//!
//! Gossip never sends events that are ancient for the receiver. A node whose
//! pending round is below a peer's ancient threshold can therefore never get
//! the events it needs from that peer. Once more than a configured fraction
//! of the peers have reported that, the node has fallen behind and can only
//! recover from a peer's state.

use shared_types::{EventWindow, NodeId};
use std::collections::BTreeSet;

/// How two event windows relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    InSync,
    /// We need events the peer already considers ancient.
    SelfFallenBehind,
    /// The peer needs events we already consider ancient.
    OtherFallenBehind,
}

impl SyncStatus {
    pub fn check(ours: &EventWindow, theirs: &EventWindow) -> Self {
        if theirs.ancient_threshold > ours.pending_round() {
            SyncStatus::SelfFallenBehind
        } else if ours.ancient_threshold > theirs.pending_round() {
            SyncStatus::OtherFallenBehind
        } else {
            SyncStatus::InSync
        }
    }
}

/// Peers we are behind, and whether that makes us fallen behind.
#[derive(Debug)]
pub struct FallenBehindMonitor {
    peers: usize,
    threshold: f64,
    reported: BTreeSet<NodeId>,
}

impl FallenBehindMonitor {
    /// `threshold` is the fraction of `peers` that must report before we
    /// count as fallen behind.
    pub fn new(peers: usize, threshold: f64) -> Self {
        Self {
            peers,
            threshold,
            reported: BTreeSet::new(),
        }
    }

    /// Record the outcome of a window comparison with `peer`. Returns true
    /// when the fallen-behind verdict changed.
    pub fn record(&mut self, peer: NodeId, status: SyncStatus) -> bool {
        let before = self.has_fallen_behind();
        if status == SyncStatus::SelfFallenBehind {
            self.reported.insert(peer);
        } else {
            self.reported.remove(&peer);
        }
        before != self.has_fallen_behind()
    }

    pub fn has_fallen_behind(&self) -> bool {
        self.peers > 0 && self.reported.len() as f64 > self.peers as f64 * self.threshold
    }

    pub fn reported(&self) -> usize {
        self.reported.len()
    }
}

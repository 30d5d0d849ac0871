//! Driving Ports (API - Inbound)
//!
//! The intake pipeline drives consensus through this trait; it owns the
//! engine behind its single-writer lock, so every method is synchronous.

use crate::domain::{Hashgraph, HashgraphResult, LivenessStatus};
use shared_types::{ConsensusRound, ConsensusSnapshot, EventWindow, Hash, PlatformEvent};

/// Consensus engine API
pub trait ConsensusEngine: Send {
    /// Insert an event whose non-ancient parents are present, returning the
    /// rounds it caused to be decided.
    fn add_event(&mut self, event: PlatformEvent) -> HashgraphResult<Vec<ConsensusRound>>;

    /// Restart from a previously decided round.
    fn load_snapshot(&mut self, snapshot: &ConsensusSnapshot);

    fn contains(&self, hash: &Hash) -> bool;

    fn event_window(&self) -> EventWindow;

    fn election_round(&self) -> u64;

    fn max_round(&self) -> u64;

    fn liveness(&self) -> LivenessStatus;

    fn snapshot(&self) -> ConsensusSnapshot;
}

impl ConsensusEngine for Hashgraph {
    fn add_event(&mut self, event: PlatformEvent) -> HashgraphResult<Vec<ConsensusRound>> {
        Hashgraph::add_event(self, event)
    }

    fn load_snapshot(&mut self, snapshot: &ConsensusSnapshot) {
        Hashgraph::load_snapshot(self, snapshot)
    }

    fn contains(&self, hash: &Hash) -> bool {
        Hashgraph::contains(self, hash)
    }

    fn event_window(&self) -> EventWindow {
        Hashgraph::event_window(self)
    }

    fn election_round(&self) -> u64 {
        Hashgraph::election_round(self)
    }

    fn max_round(&self) -> u64 {
        Hashgraph::max_round(self)
    }

    fn liveness(&self) -> LivenessStatus {
        Hashgraph::liveness(self)
    }

    fn snapshot(&self) -> ConsensusSnapshot {
        Hashgraph::snapshot(self)
    }
}

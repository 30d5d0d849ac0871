//! Versioned platform state
//!
//! Every decided round produces a new immutable version. The running hash
//! chains the hash of every consensus event in order, so two nodes that agree
//! on the running hash agree on the whole consensus history.

use super::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use shared_crypto::extend_running_hash;
use shared_types::{ConsensusRound, ConsensusSnapshot, EventWindow, Hash, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformState {
    /// Incremented by every applied round.
    pub version: u64,
    /// Latest round applied.
    pub round: u64,
    pub running_hash: Hash,
    pub consensus_timestamp: Option<Timestamp>,
    /// Consensus restart data as of `round`.
    pub snapshot: ConsensusSnapshot,
    pub event_window: EventWindow,
    pub roster_hash: Hash,
    pub consensus_events: u64,
    pub transactions: u64,
}

impl PlatformState {
    pub fn genesis(roster_hash: Hash) -> Self {
        Self {
            version: 0,
            round: 0,
            running_hash: [0u8; 32],
            consensus_timestamp: None,
            snapshot: ConsensusSnapshot::default(),
            event_window: EventWindow::genesis(),
            roster_hash,
            consensus_events: 0,
            transactions: 0,
        }
    }

    /// State after `round`; `self` is left untouched.
    ///
    /// Rounds must follow each other without gaps. Only the first round
    /// applied to a genesis state may start anywhere.
    pub fn apply_round(&self, round: &ConsensusRound) -> StateResult<PlatformState> {
        if round.round <= self.round {
            return Err(StateError::RoundRegression {
                round: round.round,
                current: self.round,
            });
        }
        if !self.is_genesis() && round.round != self.round + 1 {
            return Err(StateError::RoundGap {
                round: round.round,
                current: self.round,
            });
        }
        let running_hash = round
            .events
            .iter()
            .fold(self.running_hash, |acc, e| {
                extend_running_hash(&acc, &e.event.hash())
            });
        Ok(PlatformState {
            version: self.version + 1,
            round: round.round,
            running_hash,
            consensus_timestamp: Some(round.consensus_timestamp),
            snapshot: round.snapshot.clone(),
            event_window: round.event_window,
            roster_hash: self.roster_hash,
            consensus_events: self.consensus_events + round.events.len() as u64,
            transactions: self.transactions + round.transaction_count() as u64,
        })
    }

    pub fn is_genesis(&self) -> bool {
        self.version == 0
    }
}

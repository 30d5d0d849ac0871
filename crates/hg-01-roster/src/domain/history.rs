//! Roster history
//!
//! Rosters take effect at round boundaries. The roster for round `r` is the
//! one with the greatest start round not above `r`.

use super::{Roster, RosterError, RosterResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A roster and the first round it governs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTransition {
    pub effective_from_round: u64,
    pub roster: Arc<Roster>,
}

/// Ordered list of roster transitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterHistory {
    transitions: Vec<RosterTransition>,
}

impl RosterHistory {
    /// History with a single roster governing every round.
    pub fn new(genesis: Roster) -> Self {
        Self {
            transitions: vec![RosterTransition {
                effective_from_round: 0,
                roster: Arc::new(genesis),
            }],
        }
    }

    /// Schedule a roster that supersedes the current one from `round` on.
    pub fn add_transition(&mut self, round: u64, roster: Roster) -> RosterResult<()> {
        let previous = self
            .transitions
            .last()
            .map(|t| t.effective_from_round)
            .unwrap_or(0);
        if round <= previous {
            return Err(RosterError::NonIncreasingTransition { round, previous });
        }
        tracing::info!(
            round,
            members = roster.len(),
            total_weight = roster.total_weight(),
            "Roster transition scheduled"
        );
        self.transitions.push(RosterTransition {
            effective_from_round: round,
            roster: Arc::new(roster),
        });
        Ok(())
    }

    /// Roster governing `round`.
    pub fn roster_for_round(&self, round: u64) -> RosterResult<Arc<Roster>> {
        self.transitions
            .iter()
            .rev()
            .find(|t| t.effective_from_round <= round)
            .map(|t| Arc::clone(&t.roster))
            .ok_or(RosterError::NoRosterForRound(round))
    }

    /// Most recently scheduled roster.
    pub fn latest(&self) -> Arc<Roster> {
        // never empty: constructed with a genesis roster
        Arc::clone(&self.transitions[self.transitions.len() - 1].roster)
    }

    pub fn transitions(&self) -> &[RosterTransition] {
        &self.transitions
    }

    /// Rebuild lookups of every roster (after deserialization)
    pub fn rebuild_lookups(&mut self) {
        for transition in &mut self.transitions {
            Arc::make_mut(&mut transition.roster).rebuild_lookup();
        }
    }
}

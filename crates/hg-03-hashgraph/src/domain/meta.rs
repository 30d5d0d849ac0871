//! Per-event consensus metadata
//!
//! Metadata is only valid for the decided state it was computed under; it is
//! cleared and recomputed every time a round is decided.

use shared_types::{Hash, PlatformEvent, ROUND_NEGATIVE_INFINITY};
use std::collections::HashMap;

/// What an event can see of one creator's self-chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LastSee {
    /// No ancestor by this creator.
    Nothing,
    /// Latest ancestor by this creator.
    Sees(Hash),
    /// Two ancestors by this creator are not self-ancestors of one another.
    Fork,
}

/// Memoized round, witness flag and visibility of an event.
#[derive(Clone, Debug)]
pub struct EventMeta {
    pub round: u64,
    pub witness: bool,
    /// Indexed by member position.
    pub last_see: Vec<LastSee>,
}

impl EventMeta {
    /// Metadata of an event irrelevant to the current election.
    pub fn irrelevant(members: usize) -> Self {
        Self {
            round: ROUND_NEGATIVE_INFINITY,
            witness: false,
            last_see: vec![LastSee::Nothing; members],
        }
    }

    pub fn is_relevant(&self) -> bool {
        self.round > ROUND_NEGATIVE_INFINITY
    }
}

/// Arena slot of an inserted event.
#[derive(Clone, Debug)]
pub struct EventNode {
    pub event: PlatformEvent,
    pub consensus: bool,
    pub meta: Option<EventMeta>,
}

impl EventNode {
    pub fn new(event: PlatformEvent) -> Self {
        Self {
            event,
            consensus: false,
            meta: None,
        }
    }

    /// Round of the event, −∞ when not computed or irrelevant.
    pub fn round(&self) -> u64 {
        self.meta
            .as_ref()
            .map(|m| m.round)
            .unwrap_or(ROUND_NEGATIVE_INFINITY)
    }
}

/// Fame election of a single round's witnesses.
#[derive(Clone, Debug, Default)]
pub struct Election {
    pub round: u64,
    /// Candidate witnesses in insertion order.
    pub candidates: Vec<Hash>,
    /// Decided fame per candidate.
    pub fame: HashMap<Hash, bool>,
}

impl Election {
    pub fn new(round: u64) -> Self {
        Self {
            round,
            candidates: Vec::new(),
            fame: HashMap::new(),
        }
    }

    pub fn is_decided(&self) -> bool {
        !self.candidates.is_empty() && self.candidates.iter().all(|c| self.fame.contains_key(c))
    }

    pub fn undecided(&self) -> Vec<Hash> {
        self.candidates
            .iter()
            .filter(|c| !self.fame.contains_key(*c))
            .copied()
            .collect()
    }

    pub fn famous(&self) -> impl Iterator<Item = &Hash> {
        self.candidates
            .iter()
            .filter(|c| self.fame.get(*c).copied().unwrap_or(false))
    }
}

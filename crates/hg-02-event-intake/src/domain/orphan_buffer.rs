//! Orphan buffer
//!
//! Holds events whose non-ancient parents have not been inserted yet. An
//! orphan is released once every missing parent has been inserted or has
//! become ancient. The buffer is bounded in size (oldest evicted first) and
//! in time.

use shared_types::{EventWindow, GossipEvent, Hash, NodeId, Timestamp};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Orphan {
    pub event: GossipEvent,
    pub hash: Hash,
    pub sender: Option<NodeId>,
    pub received_at: Timestamp,
    missing: HashSet<Hash>,
}

impl Orphan {
    pub fn new(
        event: GossipEvent,
        sender: Option<NodeId>,
        received_at: Timestamp,
        missing: impl IntoIterator<Item = Hash>,
    ) -> Self {
        Self {
            hash: event.event.hash(),
            event,
            sender,
            received_at,
            missing: missing.into_iter().collect(),
        }
    }

    pub fn missing(&self) -> impl Iterator<Item = &Hash> {
        self.missing.iter()
    }
}

/// Orphans removed by `prune`.
#[derive(Debug, Default)]
pub struct PruneOutcome {
    /// No longer missing anything; insert them in the given order.
    pub ready: Vec<Orphan>,
    /// Ancient or expired.
    pub discarded: usize,
}

#[derive(Debug)]
pub struct OrphanBuffer {
    max_size: usize,
    ttl_nanos: u64,
    orphans: HashMap<Hash, Orphan>,
    /// Missing parent hash to the orphans waiting on it.
    waiting: HashMap<Hash, Vec<Hash>>,
    /// Arrival order, may hold hashes already removed.
    arrival: VecDeque<Hash>,
}

impl OrphanBuffer {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            max_size: max_size.max(1),
            ttl_nanos: ttl.as_nanos().min(u64::MAX as u128) as u64,
            orphans: HashMap::new(),
            waiting: HashMap::new(),
            arrival: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.orphans.contains_key(hash)
    }

    /// Buffer an orphan. Returns the hashes evicted to make room.
    pub fn insert(&mut self, orphan: Orphan) -> Vec<Hash> {
        let hash = orphan.hash;
        if self.orphans.contains_key(&hash) {
            return Vec::new();
        }
        for parent in &orphan.missing {
            self.waiting.entry(*parent).or_default().push(hash);
        }
        self.orphans.insert(hash, orphan);
        self.arrival.push_back(hash);

        let mut evicted = Vec::new();
        while self.orphans.len() > self.max_size {
            match self.arrival.pop_front() {
                Some(oldest) => {
                    if self.forget(&oldest) {
                        evicted.push(oldest);
                    }
                }
                None => break,
            }
        }
        evicted
    }

    /// `parent` was inserted. Returns the orphans it completed.
    pub fn release(&mut self, parent: &Hash) -> Vec<Orphan> {
        let Some(children) = self.waiting.remove(parent) else {
            return Vec::new();
        };
        let mut ready = Vec::new();
        for child in children {
            let complete = match self.orphans.get_mut(&child) {
                Some(orphan) => {
                    orphan.missing.remove(parent);
                    orphan.missing.is_empty()
                }
                None => false,
            };
            if complete {
                if let Some(orphan) = self.orphans.remove(&child) {
                    ready.push(orphan);
                }
            }
        }
        ready.sort_by_key(|o| (o.event.event.generation(), o.hash));
        ready
    }

    /// Drop orphans received more than the TTL before `now`.
    pub fn expire(&mut self, now: Timestamp) -> usize {
        let mut expired = 0;
        while let Some(front) = self.arrival.front().copied() {
            let received_at = self.orphans.get(&front).map(|o| o.received_at);
            if let Some(received_at) = received_at {
                if now.saturating_sub(received_at) <= self.ttl_nanos {
                    break;
                }
                self.forget(&front);
                expired += 1;
            }
            self.arrival.pop_front();
        }
        expired
    }

    /// Apply a new event window: discard ancient orphans, stop waiting for
    /// parents that became ancient, and hand back orphans left waiting on
    /// nothing.
    pub fn prune(&mut self, window: &EventWindow, now: Timestamp) -> PruneOutcome {
        let mut outcome = PruneOutcome {
            discarded: self.expire(now),
            ..PruneOutcome::default()
        };

        let before = self.orphans.len();
        self.orphans
            .retain(|_, orphan| !window.is_ancient(orphan.event.event.birth_round));
        outcome.discarded += before - self.orphans.len();

        let mut ready = Vec::new();
        for (hash, orphan) in self.orphans.iter_mut() {
            for parent in orphan.event.event.parents() {
                if window.is_ancient(parent.birth_round) {
                    orphan.missing.remove(&parent.hash);
                }
            }
            if orphan.missing.is_empty() {
                ready.push(*hash);
            }
        }
        for hash in ready {
            if let Some(orphan) = self.orphans.remove(&hash) {
                outcome.ready.push(orphan);
            }
        }
        outcome
            .ready
            .sort_by_key(|o| (o.event.event.generation(), o.hash));

        self.rebuild_index();
        outcome
    }

    /// Drop an orphan and its entries in the waiting index.
    fn forget(&mut self, hash: &Hash) -> bool {
        let Some(orphan) = self.orphans.remove(hash) else {
            return false;
        };
        for parent in &orphan.missing {
            if let Some(children) = self.waiting.get_mut(parent) {
                children.retain(|child| child != hash);
                if children.is_empty() {
                    self.waiting.remove(parent);
                }
            }
        }
        true
    }

    fn rebuild_index(&mut self) {
        self.waiting.clear();
        for (hash, orphan) in &self.orphans {
            for parent in &orphan.missing {
                self.waiting.entry(*parent).or_default().push(*hash);
            }
        }
        let orphans = &self.orphans;
        self.arrival.retain(|h| orphans.contains_key(h));
    }
}

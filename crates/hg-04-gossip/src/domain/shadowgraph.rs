//! Shadowgraph
//!
//! Read view of the non-ancient events this node has inserted, used to
//! build sync summaries and to answer what a peer is missing. Readers never
//! block intake for longer than a map insert.

use super::SyncSummary;
use parking_lot::RwLock;
use shared_types::{EventWindow, GossipEvent, Hash, NodeId, PlatformEvent, Timestamp};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Freshness filter for outgoing events.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessFilter {
    pub self_id: NodeId,
    pub now: Timestamp,
    pub threshold_nanos: u64,
}

impl FreshnessFilter {
    /// Other creators' events are held back until known for the threshold;
    /// the peer most likely receives them from someone else meanwhile.
    fn allows(&self, event: &PlatformEvent) -> bool {
        event.creator() == self.self_id
            || self.now.saturating_sub(event.time_received) >= self.threshold_nanos
    }
}

#[derive(Debug, Default)]
struct Inner {
    events: HashMap<Hash, PlatformEvent>,
    /// Creator to its events by generation.
    by_creator: HashMap<NodeId, BTreeMap<u64, Vec<Hash>>>,
    window: EventWindow,
}

#[derive(Debug, Default)]
pub struct Shadowgraph {
    inner: RwLock<Inner>,
}

impl Shadowgraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, event: &PlatformEvent) {
        let mut inner = self.inner.write();
        if inner.window.is_ancient(event.birth_round()) {
            return;
        }
        let hash = event.hash();
        if inner.events.insert(hash, event.clone()).is_none() {
            inner
                .by_creator
                .entry(event.creator())
                .or_default()
                .entry(event.generation())
                .or_default()
                .push(hash);
        }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.read().events.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }

    pub fn window(&self) -> EventWindow {
        self.inner.read().window
    }

    /// Adopt a new window and drop events that became ancient.
    pub fn set_window(&self, window: EventWindow) {
        let mut inner = self.inner.write();
        inner.window = window;
        inner
            .events
            .retain(|_, e| !window.is_ancient(e.birth_round()));
        let Inner {
            events, by_creator, ..
        } = &mut *inner;
        for generations in by_creator.values_mut() {
            for hashes in generations.values_mut() {
                hashes.retain(|h| events.contains_key(h));
            }
            generations.retain(|_, hashes| !hashes.is_empty());
        }
        by_creator.retain(|_, generations| !generations.is_empty());
    }

    pub fn summary(&self) -> SyncSummary {
        let inner = self.inner.read();
        let mut summary = SyncSummary {
            event_window: inner.window,
            ..SyncSummary::default()
        };
        for generations in inner.by_creator.values() {
            if let Some(hashes) = generations.values().next_back() {
                summary.tips.extend(
                    hashes
                        .iter()
                        .filter_map(|h| inner.events.get(h))
                        .map(PlatformEvent::descriptor),
                );
            }
        }
        summary
            .tips
            .sort_by(|a, b| (a.creator, a.hash).cmp(&(b.creator, b.hash)));
        summary
    }

    /// Events the summarised peer lacks and can still use, parents first.
    ///
    /// The peer has every tip it reported that we also hold, and all of their
    /// ancestors. Everything else non-ancient for the peer is sent, so both
    /// branches of a fork reach it.
    pub fn events_unknown_to(
        &self,
        peer: &SyncSummary,
        filter: Option<FreshnessFilter>,
    ) -> Vec<GossipEvent> {
        let inner = self.inner.read();
        let known = inner.known_by(peer);
        let mut missing: Vec<&PlatformEvent> = inner
            .events
            .values()
            .filter(|e| !peer.event_window.is_ancient(e.birth_round()))
            .filter(|e| !known.contains(&e.hash()))
            .filter(|e| filter.map_or(true, |f| f.allows(e)))
            .collect();
        missing.sort_by_key(|e| (e.generation(), e.hash()));
        missing.into_iter().map(|e| e.gossip().clone()).collect()
    }
}

impl Inner {
    /// Our events the peer's tips prove it has.
    fn known_by(&self, peer: &SyncSummary) -> HashSet<Hash> {
        let mut known = HashSet::new();
        let mut stack: Vec<Hash> = peer
            .tips
            .iter()
            .map(|tip| tip.hash)
            .filter(|hash| self.events.contains_key(hash))
            .collect();
        while let Some(hash) = stack.pop() {
            if !known.insert(hash) {
                continue;
            }
            if let Some(event) = self.events.get(&hash) {
                stack.extend(
                    event
                        .parents()
                        .map(|p| p.hash)
                        .filter(|h| self.events.contains_key(h) && !known.contains(h)),
                );
            }
        }
        known
    }
}

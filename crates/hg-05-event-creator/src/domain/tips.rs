//! Tip tracking
//!
//! Follows every event intake inserts and keeps, per event, a vector clock:
//! the highest generation of each creator among the event and its
//! ancestors. Comparing a creator's latest event with the clock of our own
//! latest event tells whether making an event would carry new information.
//!
//! ## Data Structures
//!
//! - `events`: tracked events by hash, pruned with the event window
//! - `latest`: highest-generation event per creator
//! - `last_used`: creation counter at which a creator was last other-parent

use shared_types::{EventDescriptor, EventWindow, Hash, NodeId, PlatformEvent, Timestamp};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
pub struct TrackedEvent {
    pub descriptor: EventDescriptor,
    pub time_created: Timestamp,
    clock: HashMap<NodeId, u64>,
}

impl TrackedEvent {
    /// Highest generation by `creator` this event descends from.
    pub fn seen_generation(&self, creator: NodeId) -> Option<u64> {
        self.clock.get(&creator).copied()
    }
}

#[derive(Debug)]
pub struct TipTracker {
    self_id: NodeId,
    events: HashMap<Hash, TrackedEvent>,
    latest: BTreeMap<NodeId, Hash>,
    last_used: HashMap<NodeId, u64>,
    uses: u64,
    window: EventWindow,
}

impl TipTracker {
    pub fn new(self_id: NodeId) -> Self {
        Self {
            self_id,
            events: HashMap::new(),
            latest: BTreeMap::new(),
            last_used: HashMap::new(),
            uses: 0,
            window: EventWindow::genesis(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn window(&self) -> EventWindow {
        self.window
    }

    pub fn add(&mut self, event: &PlatformEvent) {
        let hash = event.hash();
        if self.events.contains_key(&hash) {
            return;
        }

        let mut clock: HashMap<NodeId, u64> = HashMap::new();
        for parent in event.parents() {
            match self.events.get(&parent.hash) {
                Some(tracked) => {
                    for (creator, generation) in &tracked.clock {
                        merge(&mut clock, *creator, *generation);
                    }
                }
                // Pruned parent: only its own position is still known.
                None => merge(&mut clock, parent.creator, parent.generation),
            }
        }
        merge(&mut clock, event.creator(), event.generation());

        let creator = event.creator();
        let newer = match self.latest.get(&creator).and_then(|h| self.events.get(h)) {
            Some(current) => event.generation() > current.descriptor.generation,
            None => true,
        };
        if newer {
            self.latest.insert(creator, hash);
        }

        self.events.insert(
            hash,
            TrackedEvent {
                descriptor: event.descriptor(),
                time_created: event.time_created(),
                clock,
            },
        );
    }

    /// Drop ancient events, keeping every creator's latest.
    pub fn set_window(&mut self, window: EventWindow) {
        self.window = window;
        let latest: Vec<Hash> = self.latest.values().copied().collect();
        self.events.retain(|hash, tracked| {
            !window.is_ancient(tracked.descriptor.birth_round) || latest.contains(hash)
        });
    }

    /// Our own latest event, the next self-parent.
    pub fn self_tip(&self) -> Option<&TrackedEvent> {
        self.latest_of(self.self_id)
    }

    pub fn latest_of(&self, creator: NodeId) -> Option<&TrackedEvent> {
        self.latest.get(&creator).and_then(|h| self.events.get(h))
    }

    /// Latest events of other creators that our self tip does not descend
    /// from.
    pub fn new_information(&self) -> Vec<&TrackedEvent> {
        let tip = self.self_tip();
        self.latest
            .iter()
            .filter(|(creator, _)| **creator != self.self_id)
            .filter_map(|(_, hash)| self.events.get(hash))
            .filter(|candidate| {
                let seen = tip.and_then(|t| t.seen_generation(candidate.descriptor.creator));
                seen.map_or(true, |g| g < candidate.descriptor.generation)
            })
            .collect()
    }

    /// Candidate whose creator was used as other-parent least recently,
    /// lowest node id on ties.
    pub fn choose_other_parent(&self) -> Option<EventDescriptor> {
        self.new_information()
            .into_iter()
            .min_by_key(|c| {
                let creator = c.descriptor.creator;
                (self.last_used.get(&creator).copied().unwrap_or(0), creator)
            })
            .map(|c| c.descriptor)
    }

    pub fn mark_used(&mut self, creator: NodeId) {
        self.uses += 1;
        self.last_used.insert(creator, self.uses);
    }
}

fn merge(clock: &mut HashMap<NodeId, u64>, creator: NodeId, generation: u64) {
    let entry = clock.entry(creator).or_insert(generation);
    if generation > *entry {
        *entry = generation;
    }
}

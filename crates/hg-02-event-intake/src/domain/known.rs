//! Events already inserted into consensus, kept while non-ancient

use super::ValidationError;
use shared_types::{EventDescriptor, EventWindow, Hash, PlatformEvent, Timestamp, UnsignedEvent};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownEvent {
    pub descriptor: EventDescriptor,
    pub time_created: Timestamp,
}

#[derive(Debug, Default)]
pub struct KnownEvents {
    events: HashMap<Hash, KnownEvent>,
}

impl KnownEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: &PlatformEvent) {
        self.events.insert(
            event.hash(),
            KnownEvent {
                descriptor: event.descriptor(),
                time_created: event.time_created(),
            },
        );
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.events.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<&KnownEvent> {
        self.events.get(hash)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Non-ancient parents of `event` that are not known yet.
    pub fn missing_parents(&self, event: &UnsignedEvent, window: &EventWindow) -> Vec<Hash> {
        event
            .parents()
            .filter(|p| !window.is_ancient(p.birth_round) && !self.contains(&p.hash))
            .map(|p| p.hash)
            .collect()
    }

    /// Parents that are known must match their descriptors, and the event
    /// must be created after its self-parent.
    pub fn check_links(&self, event: &UnsignedEvent) -> Result<(), ValidationError> {
        for parent in event.parents() {
            if let Some(known) = self.get(&parent.hash) {
                if known.descriptor != *parent {
                    return Err(ValidationError::ParentMismatch(parent.hash));
                }
            }
        }
        if let Some(self_parent) = event.self_parent.as_ref().and_then(|p| self.get(&p.hash)) {
            if event.time_created <= self_parent.time_created {
                return Err(ValidationError::TimeNotAfterSelfParent {
                    time_created: event.time_created,
                    self_parent_time: self_parent.time_created,
                });
            }
        }
        Ok(())
    }

    /// Forget events that became ancient. Returns how many were dropped.
    pub fn prune(&mut self, window: &EventWindow) -> usize {
        let before = self.events.len();
        self.events
            .retain(|_, known| !window.is_ancient(known.descriptor.birth_round));
        before - self.events.len()
    }
}

//! Roster domain entities
//!
//! Membership, public keys and stake weights, plus the stake thresholds every
//! other subsystem votes with.

use super::{RosterError, RosterResult};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::Blake3Hasher;
use shared_types::{Hash, NodeId, PublicKey};
use std::collections::HashMap;

/// One roster member.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub node_id: NodeId,
    #[serde_as(as = "Bytes")]
    pub public_key: PublicKey,
    pub weight: u64,
}

impl RosterEntry {
    pub fn new(node_id: NodeId, public_key: PublicKey, weight: u64) -> Self {
        Self {
            node_id,
            public_key,
            weight,
        }
    }
}

/// Weighted membership table, ordered by node id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    total_weight: u64,
    /// Quick lookup by node id
    #[serde(skip)]
    lookup: HashMap<NodeId, usize>,
}

impl PartialEq for Roster {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Roster {}

impl Roster {
    /// Build a roster. Entries are sorted by node id.
    pub fn new(mut entries: Vec<RosterEntry>) -> RosterResult<Self> {
        if entries.is_empty() {
            return Err(RosterError::Empty);
        }
        entries.sort_by_key(|e| e.node_id);
        if let Some(pair) = entries.windows(2).find(|w| w[0].node_id == w[1].node_id) {
            return Err(RosterError::DuplicateMember(pair[0].node_id));
        }

        let total_weight = entries
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.weight))
            .ok_or(RosterError::WeightOverflow)?;
        if total_weight == 0 {
            return Err(RosterError::ZeroWeight);
        }

        let mut roster = Self {
            entries,
            total_weight,
            lookup: HashMap::new(),
        };
        roster.rebuild_lookup();
        Ok(roster)
    }

    /// Rebuild the lookup table (after deserialization)
    pub fn rebuild_lookup(&mut self) {
        self.lookup = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.node_id, i))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.lookup.contains_key(&node_id)
    }

    pub fn entry(&self, node_id: NodeId) -> RosterResult<&RosterEntry> {
        self.lookup
            .get(&node_id)
            .map(|&idx| &self.entries[idx])
            .ok_or(RosterError::UnknownMember(node_id))
    }

    /// Position of a member in node-id order.
    pub fn index_of(&self, node_id: NodeId) -> Option<usize> {
        self.lookup.get(&node_id).copied()
    }

    /// Weight of a member, zero for non-members.
    pub fn weight_of(&self, node_id: NodeId) -> u64 {
        self.lookup
            .get(&node_id)
            .map(|&idx| self.entries[idx].weight)
            .unwrap_or(0)
    }

    pub fn public_key(&self, node_id: NodeId) -> Option<&PublicKey> {
        self.entry(node_id).ok().map(|e| &e.public_key)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Member ids in ascending order.
    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.node_id)
    }

    /// More than two thirds of the total weight.
    pub fn is_supermajority(&self, weight: u64) -> bool {
        3 * weight as u128 > 2 * self.total_weight as u128
    }

    /// More than half of the total weight.
    pub fn is_majority(&self, weight: u64) -> bool {
        2 * weight as u128 > self.total_weight as u128
    }

    /// At least one third of the total weight.
    pub fn is_strong_minority(&self, weight: u64) -> bool {
        3 * weight as u128 >= self.total_weight as u128
    }

    /// True if a single member holds a supermajority by itself.
    pub fn node_has_supermajority(&self) -> bool {
        self.entries.iter().any(|e| self.is_supermajority(e.weight))
    }

    /// Stable digest of the membership table.
    pub fn hash(&self) -> Hash {
        let mut hasher = Blake3Hasher::new();
        for entry in &self.entries {
            hasher.update(&entry.node_id.0.to_le_bytes());
            hasher.update(&entry.public_key);
            hasher.update(&entry.weight.to_le_bytes());
        }
        hasher.finalize()
    }
}

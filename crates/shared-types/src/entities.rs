//! # Core Domain Entities
//!
//! Defines the hashgraph data model shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `Hash`, `Signature`, `PublicKey`
//! - **Events**: `EventDescriptor`, `UnsignedEvent`, `GossipEvent`, `PlatformEvent`
//! - **Consensus output**: `ConsensusEvent`, `ConsensusRound`, `ConsensusSnapshot`
//! - **Windows**: `EventWindow`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (SHA-256 for events, BLAKE3 for running hashes).
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Nanoseconds since the UNIX epoch.
pub type Timestamp = u64;

/// Round of events that are irrelevant to consensus (ancient, already
/// consensus, or older than the last judges).
pub const ROUND_NEGATIVE_INFINITY: u64 = 0;

/// The first round of a fresh network.
pub const ROUND_FIRST: u64 = 1;

/// Generation of an event without parents.
pub const FIRST_GENERATION: u64 = 1;

/// Roster member identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// A peer identifier (alias for `NodeId` in gossip contexts).
pub type PeerId = NodeId;

/// Short hex rendering of a hash for logs.
pub fn short_hash(hash: &Hash) -> String {
    hash[..4].iter().map(|b| format!("{:02x}", b)).collect()
}

// =============================================================================
// CLUSTER B: EVENTS
// =============================================================================

/// Compact reference to a parent event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDescriptor {
    /// Hash of the referenced event.
    pub hash: Hash,
    /// Creator of the referenced event.
    pub creator: NodeId,
    /// Generation of the referenced event.
    pub generation: u64,
    /// Birth round of the referenced event.
    pub birth_round: u64,
}

/// The hashed and signed body of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedEvent {
    /// Node that created the event.
    pub creator: NodeId,
    /// Previous event by the same creator, `None` for a node's first event.
    pub self_parent: Option<EventDescriptor>,
    /// Latest event by another node known to the creator.
    pub other_parent: Option<EventDescriptor>,
    /// Creator's wall clock at creation.
    pub time_created: Timestamp,
    /// Consensus round the creator was waiting on when it created the event.
    pub birth_round: u64,
    /// Opaque application transactions.
    pub transactions: Vec<Vec<u8>>,
}

impl UnsignedEvent {
    /// Compute the event hash.
    ///
    /// Every field is fed to SHA-256 with explicit presence markers and length
    /// prefixes so the encoding is canonical.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.creator.0.to_le_bytes());
        for parent in [&self.self_parent, &self.other_parent] {
            match parent {
                Some(descriptor) => {
                    hasher.update([1u8]);
                    hasher.update(descriptor.hash);
                    hasher.update(descriptor.creator.0.to_le_bytes());
                    hasher.update(descriptor.generation.to_le_bytes());
                    hasher.update(descriptor.birth_round.to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
        hasher.update(self.time_created.to_le_bytes());
        hasher.update(self.birth_round.to_le_bytes());
        hasher.update((self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            hasher.update((tx.len() as u64).to_le_bytes());
            hasher.update(tx);
        }
        hasher.finalize().into()
    }

    /// Parents that are present, self-parent first.
    pub fn parents(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.self_parent.iter().chain(self.other_parent.iter())
    }

    /// One more than the highest parent generation.
    pub fn generation(&self) -> u64 {
        self.parents()
            .map(|p| p.generation + 1)
            .max()
            .unwrap_or(FIRST_GENERATION)
    }

    /// Total transaction payload size.
    pub fn transaction_bytes(&self) -> usize {
        self.transactions.iter().map(Vec::len).sum()
    }
}

/// The wire record exchanged by gossip and stored in the PCES.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GossipEvent {
    /// The signed body.
    pub event: UnsignedEvent,
    /// Creator's Ed25519 signature over `event.hash()`.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

#[derive(Debug)]
struct PlatformEventInner {
    gossip: GossipEvent,
    hash: Hash,
    generation: u64,
}

/// An event as held by a node: the wire record plus cached identity and
/// local receipt metadata.
///
/// Cloning is cheap; the record itself is shared.
#[derive(Debug, Clone)]
pub struct PlatformEvent {
    inner: Arc<PlatformEventInner>,
    /// Local wall clock when the event was first received.
    pub time_received: Timestamp,
    /// Peer that delivered the event, `None` for self-created or replayed events.
    pub sender: Option<NodeId>,
}

impl PlatformEvent {
    /// Wrap a wire record, computing its hash and generation.
    pub fn new(gossip: GossipEvent) -> Self {
        let hash = gossip.event.hash();
        let generation = gossip.event.generation();
        Self {
            inner: Arc::new(PlatformEventInner {
                gossip,
                hash,
                generation,
            }),
            time_received: 0,
            sender: None,
        }
    }

    /// Attach receipt metadata.
    pub fn received(mut self, sender: Option<NodeId>, time_received: Timestamp) -> Self {
        self.sender = sender;
        self.time_received = time_received;
        self
    }

    pub fn hash(&self) -> Hash {
        self.inner.hash
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    pub fn creator(&self) -> NodeId {
        self.inner.gossip.event.creator
    }

    pub fn birth_round(&self) -> u64 {
        self.inner.gossip.event.birth_round
    }

    pub fn time_created(&self) -> Timestamp {
        self.inner.gossip.event.time_created
    }

    pub fn self_parent(&self) -> Option<&EventDescriptor> {
        self.inner.gossip.event.self_parent.as_ref()
    }

    pub fn other_parent(&self) -> Option<&EventDescriptor> {
        self.inner.gossip.event.other_parent.as_ref()
    }

    pub fn parents(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.inner.gossip.event.parents()
    }

    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.inner.gossip.event.transactions
    }

    pub fn signature(&self) -> &Signature {
        &self.inner.gossip.signature
    }

    pub fn unsigned(&self) -> &UnsignedEvent {
        &self.inner.gossip.event
    }

    pub fn gossip(&self) -> &GossipEvent {
        &self.inner.gossip
    }

    /// Descriptor used by children to reference this event.
    pub fn descriptor(&self) -> EventDescriptor {
        EventDescriptor {
            hash: self.hash(),
            creator: self.creator(),
            generation: self.generation(),
            birth_round: self.birth_round(),
        }
    }
}

impl PartialEq for PlatformEvent {
    fn eq(&self, other: &Self) -> bool {
        self.inner.hash == other.inner.hash
    }
}

impl Eq for PlatformEvent {}

impl fmt::Display for PlatformEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} g{} br{} {})",
            self.creator(),
            self.generation(),
            self.birth_round(),
            short_hash(&self.hash())
        )
    }
}

// =============================================================================
// CLUSTER C: CONSENSUS OUTPUT
// =============================================================================

/// Ancient-event bookkeeping derived from the latest consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    /// Latest round that reached consensus, 0 before any.
    pub latest_consensus_round: u64,
    /// Events with a birth round below this value are ancient.
    pub ancient_threshold: u64,
}

impl EventWindow {
    /// Window of a node that has not decided any round.
    pub fn genesis() -> Self {
        Self {
            latest_consensus_round: ROUND_NEGATIVE_INFINITY,
            ancient_threshold: ROUND_FIRST,
        }
    }

    /// Window after `latest_consensus_round` keeping `rounds_non_ancient` rounds.
    pub fn new(latest_consensus_round: u64, rounds_non_ancient: u64) -> Self {
        let ancient_threshold = (latest_consensus_round + 1)
            .saturating_sub(rounds_non_ancient)
            .max(ROUND_FIRST);
        Self {
            latest_consensus_round,
            ancient_threshold,
        }
    }

    /// Round the network is currently trying to decide.
    pub fn pending_round(&self) -> u64 {
        self.latest_consensus_round + 1
    }

    pub fn is_ancient(&self, birth_round: u64) -> bool {
        birth_round < self.ancient_threshold
    }
}

impl Default for EventWindow {
    fn default() -> Self {
        Self::genesis()
    }
}

/// An event with its final position in the total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusEvent {
    pub event: PlatformEvent,
    /// Position in the global order, starting at 0.
    pub consensus_order: u64,
    /// Consensus timestamp, strictly increasing along the order.
    pub consensus_timestamp: Timestamp,
    /// Round whose judges made this event reach consensus.
    pub round_received: u64,
    /// True for the final event of its round.
    pub last_in_round: bool,
}

/// Minimal data required to resume consensus after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConsensusSnapshot {
    /// Latest decided round.
    pub round: u64,
    /// Judges of `round`, sorted.
    pub judges: Vec<Hash>,
    /// Order number the next consensus event receives.
    pub next_consensus_order: u64,
    /// Timestamp of the last transaction that reached consensus.
    pub last_consensus_timestamp: Option<Timestamp>,
    /// Latest consensus event of every self-chain, sorted by creator then
    /// hash. Replayed events on or below a tip already reached consensus.
    pub consensus_tips: Vec<EventDescriptor>,
}

/// A decided round and the events it brought to consensus, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsensusRound {
    pub round: u64,
    /// Judge hashes, sorted.
    pub judges: Vec<Hash>,
    pub events: Vec<ConsensusEvent>,
    /// Timestamp attributed to the round (last event, or judge median if empty).
    pub consensus_timestamp: Timestamp,
    pub snapshot: ConsensusSnapshot,
    /// Window in effect once this round is applied.
    pub event_window: EventWindow,
}

impl ConsensusRound {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn transaction_count(&self) -> usize {
        self.events.iter().map(|e| e.event.transactions().len()).sum()
    }
}

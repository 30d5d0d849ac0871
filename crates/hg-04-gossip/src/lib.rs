//! # Gossip Subsystem
//!
//! Event dissemination by pairwise sync.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────┐  summary / events   ┌──────────────┐
//!  Shadowgraph ←─┤ GossipService├────PeerTransport────┤ remote node  │
//!   (RwLock)     └──────┬───────┘                     └──────────────┘
//!                       │ EventSubmitter
//!                       ↓
//!                  Event Intake
//! ```
//!
//! - The shadowgraph mirrors the non-ancient events intake has inserted.
//! - A sync sends every event that is not an ancestor of a tip the peer
//!   reported, sorted so parents precede children, and never sends events
//!   ancient for the peer.
//! - A node whose window trails the ancient threshold of enough peers has
//!   fallen behind: gossip can no longer deliver the events it needs.
//! - Peer choice is random, weighted by reputation and discounted by round
//!   lag. Failures cost reputation and back the peer off exponentially.

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    FreshnessFilter, GossipConfig, GossipError, GossipResult, PeerState, PeerTable,
    ReputationConfig, Shadowgraph, SyncReport, SyncRequest, SyncResponse, SyncSummary,
};
pub use ports::{EventSubmitter, GossipApi, PeerTransport};
pub use service::GossipService;

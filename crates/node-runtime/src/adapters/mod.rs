//! # Adapter Implementations
//!
//! Implementations of the subsystems' outbound ports, connecting them to
//! each other, to storage and to the in-process network.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   OUTER LAYER (Adapters)                      │
//! │  PcesJournal, RoundObserver, LocalNetwork, subsystem links    │
//! └───────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   MIDDLE LAYER (Ports)                        │
//! │  EventJournal, ConsensusObserver, PeerTransport, EventSink... │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod journal;
pub mod links;
pub mod network;
pub mod observer;

pub use journal::{PcesJournal, PruneFloor};
pub use links::{
    CreatorIntakeLink, CreatorSink, Deferred, GossipPenalizer, IntakeSubmitter, NodeIntake,
    ShadowgraphSink,
};
pub use network::LocalNetwork;
pub use observer::{NodeStateService, RoundObserver};

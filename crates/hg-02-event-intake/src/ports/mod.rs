//! Ports (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::EventIntakeApi;
pub use outbound::{ConsensusObserver, EventJournal, EventSink, PeerPenalizer, SignatureVerifier};

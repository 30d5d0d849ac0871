//! # Event Intake Subsystem
//!
//! Every event, whether gossiped, self-created or replayed from the journal,
//! enters consensus through this pipeline.
//!
//! ## Stages
//!
//! 1. Internal validation (transaction limits, parent creators, birth round)
//! 2. Roster membership of the creator and parent creators
//! 3. Signature verification against the creator's roster key
//! 4. Ancient check against the current event window
//! 5. Deduplication
//! 6. Orphan buffering until non-ancient parents are known
//! 7. Write-ahead to the event journal
//! 8. Insertion into the consensus engine, round delivery
//!
//! Invalid events are reported to the `PeerPenalizer`. A journal failure
//! halts the pipeline: no event reaches consensus without being durable.

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::Ed25519SignatureVerifier;
pub use domain::{IntakeConfig, IntakeError, IntakeOutcome, IntakeResult, ValidationError};
pub use ports::{
    ConsensusObserver, EventIntakeApi, EventJournal, EventSink, PeerPenalizer, SignatureVerifier,
};
pub use service::{EventIntakeService, IntakePorts, IntakeStatus};


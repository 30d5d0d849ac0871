//! # Event Creator Subsystem
//!
//! Builds, signs and submits this node's own events.
//!
//! ## Creation Rules
//!
//! - Self-parent is our latest event; other-parent is the latest event of
//!   another creator we have not yet seen, preferring the creator used
//!   least recently, then the lowest node id.
//! - Except for our first event, an event is only created when it would
//!   reference something new.
//! - Events are created when transactions wait or the heartbeat elapses,
//!   and held back while intake is backlogged or too many rounds are
//!   undecided.
//! - `birth_round` is at least the pending round and every parent's birth
//!   round; `time_created` is strictly after the self-parent's.

pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    CreationDecision, CreationPressure, CreatorConfig, CreatorError, CreatorResult, PoolConfig,
    SkipReason, TipTracker, TrackedEvent, TransactionPool,
};
pub use ports::{CreatorIntake, EventCreatorApi};
pub use service::EventCreatorService;

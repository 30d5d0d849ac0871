//! # Shared Types Crate
//!
//! This crate contains the hashgraph data model used by every subsystem:
//! events and their descriptors, consensus output, and event windows.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Events**: A `PlatformEvent` never changes after it is built;
//!   consensus metadata lives in `ConsensusEvent`, not in the event.
//! - **Hash Links**: Events reference parents by `EventDescriptor`, never by
//!   pointer, so the DAG can be stored as an arena keyed by hash.

pub mod entities;
pub mod time;

pub use entities::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};

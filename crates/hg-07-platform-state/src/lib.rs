//! # Platform State Subsystem
//!
//! Versioned, immutable state produced by applying consensus rounds in order.
//!
//! ## Responsibilities
//!
//! - Fold consensus events into a running hash per decided round
//! - Publish the latest version to concurrent readers
//! - Persist periodic checkpoints carrying the consensus restart snapshot
//!
//! ## Architecture
//!
//! ```text
//! ConsensusRound ──→ PlatformStateService ──→ SharedPlatformState (readers)
//!                           │
//!                           └──→ StateStore (file / memory checkpoints)
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileStateStore, InMemoryStateStore};
pub use domain::{PlatformState, SharedPlatformState, StateConfig, StateError, StateResult};
pub use ports::outbound::StateStore;
pub use service::PlatformStateService;

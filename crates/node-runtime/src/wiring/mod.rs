//! # Node Wiring
//!
//! Each subsystem defines its ports; the runtime provides the adapters and
//! connects one node's subsystems:
//!
//! ```text
//!                 ┌───────────────┐
//!  LocalNetwork ←─┤    Gossip     │←── Shadowgraph ←─┐
//!                 └──────┬────────┘                  │ sinks
//!                        ↓ submit                    │
//!  Creator ─submit──→ ┌───────────────┐ ──────────────┘
//!     ↑ tips          │ Event Intake  │ ──append──→ PCES
//!     └───── sinks ── └──────┬────────┘
//!                            ↓ add_event
//!                     ┌───────────────┐
//!                     │   Hashgraph   │
//!                     └──────┬────────┘
//!                            ↓ ConsensusRound
//!                   Platform State → round channel
//! ```

pub mod cluster;
pub mod node;

pub use cluster::{LocalCluster, NodeReport};
pub use node::HashgraphNode;

use crate::container::ConfigError;
use crate::genesis::GenesisError;
use hg_02_event_intake::IntakeError;
use hg_06_pces::PcesError;
use hg_07_platform_state::StateError;
use shared_types::NodeId;
use thiserror::Error;

/// Node startup errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Genesis(#[from] GenesisError),

    #[error("Preconsensus event stream: {0}")]
    Pces(#[from] PcesError),

    #[error("Platform state: {0}")]
    State(#[from] StateError),

    #[error("Replay failed: {0}")]
    Intake(#[from] IntakeError),

    #[error("{0} is not in the roster")]
    UnknownNode(NodeId),
}

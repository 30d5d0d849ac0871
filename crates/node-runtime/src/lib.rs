//! # Node Runtime Library
//!
//! Builds and runs hashgraph nodes. The `main.rs` binary runs a local
//! network of nodes in one process; integration tests use the same types.
//!
//! ## Modules
//!
//! - `container/` - Node configuration and `HG_*` environment overrides
//! - `genesis/` - Round-zero roster and member identities
//! - `adapters/` - Port implementations connecting subsystems
//! - `wiring/` - Node startup, restart and the local cluster

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod wiring;

pub use container::{load_config, ConfigError, NodeConfig};
pub use genesis::{Genesis, GenesisBuilder, GenesisConfig};
pub use wiring::{HashgraphNode, LocalCluster, NodeReport, RuntimeError};

//! # Node Container
//!
//! Configuration shared by every node the runtime starts.

pub mod config;

pub use config::{load_config, load_config_from, ConfigError, NodeConfig};

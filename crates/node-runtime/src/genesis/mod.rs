//! # Genesis Module
//!
//! The round-zero roster. Every node of a network builds the same roster
//! from the same network secret and weights.

pub mod builder;

pub use builder::{Genesis, GenesisBuilder, GenesisConfig, GenesisError};

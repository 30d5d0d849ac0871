//! # hg-03-hashgraph
//!
//! Hashgraph consensus engine using virtual voting.
//!
//! ## Overview
//!
//! - **Rounds and witnesses**: an event advances a round when it strongly sees
//!   witnesses of its parents' round holding more than 2/3 of the stake
//! - **Fame**: witnesses of later rounds vote; a supermajority decides, and
//!   every `coin_freq`-th voting round falls back to a signature coin
//! - **Ordering**: common ancestors of a round's judges reach consensus,
//!   sorted by median received time then whitened hash
//! - **Restart**: a `ConsensusSnapshot` plus the replayed preconsensus events
//!   reproduce the live engine state
//!
//! ## Architecture
//!
//! ```text
//! Event Intake ──add_event──→ Hashgraph ──ConsensusRound──→ Platform State
//!                                 │
//!                                 └── EventWindow ──→ Gossip / PCES / Creator
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use hg_03_hashgraph::{ConsensusConfig, Hashgraph};
//!
//! let mut hashgraph = Hashgraph::new(ConsensusConfig::default(), rosters);
//! for round in hashgraph.add_event(event)? {
//!     deliver(round);
//! }
//! ```

pub mod domain;
pub mod metrics;
pub mod ports;

pub use domain::{
    ConsensusClock, ConsensusConfig, Hashgraph, HashgraphError, HashgraphResult, LivenessStatus,
};
pub use ports::inbound::ConsensusEngine;

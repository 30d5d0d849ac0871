//! # Integration Scenarios
//!
//! - `consensus_flows` - intake, journal, hashgraph and platform state of
//!   one node fed a prepared DAG
//! - `fallen_behind` - window comparison during gossip and its report in
//!   intake status
//! - `restart` - crash and resume from checkpoint plus journal replay
//! - `live_network` - full nodes gossiping over the in-process network

pub mod consensus_flows;
pub mod fallen_behind;
pub mod live_network;
pub mod restart;

//! # Hashgraph Metrics
//!
//! Prometheus metrics for monitoring virtual voting.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! hg-03-hashgraph = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `hashgraph_events_added_total` - Events inserted into the hashgraph
//! - `hashgraph_rounds_decided_total` - Rounds whose fame was decided
//! - `hashgraph_consensus_events_total` - Events that reached consensus
//! - `hashgraph_coin_votes_total` - Votes cast in coin rounds
//! - `hashgraph_stalled_rounds_total` - Stalled-round alerts raised
//! - `hashgraph_election_round` - Round currently being voted on

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Events inserted
    pub static ref EVENTS_ADDED: IntCounter = register_int_counter!(
        "hashgraph_events_added_total",
        "Total number of events inserted into the hashgraph"
    )
    .expect("Failed to create EVENTS_ADDED metric");

    /// Rounds decided
    pub static ref ROUNDS_DECIDED: IntCounter = register_int_counter!(
        "hashgraph_rounds_decided_total",
        "Total number of rounds whose fame was decided"
    )
    .expect("Failed to create ROUNDS_DECIDED metric");

    /// Events that reached consensus
    pub static ref CONSENSUS_EVENTS: IntCounter = register_int_counter!(
        "hashgraph_consensus_events_total",
        "Total number of events that reached consensus"
    )
    .expect("Failed to create CONSENSUS_EVENTS metric");

    /// Coin votes
    pub static ref COIN_VOTES: IntCounter = register_int_counter!(
        "hashgraph_coin_votes_total",
        "Total number of votes cast in coin rounds"
    )
    .expect("Failed to create COIN_VOTES metric");

    /// Stalled-round alerts
    pub static ref STALLED_ROUNDS: IntCounter = register_int_counter!(
        "hashgraph_stalled_rounds_total",
        "Total number of stalled-round alerts"
    )
    .expect("Failed to create STALLED_ROUNDS metric");

    /// Current election round
    pub static ref ELECTION_ROUND: IntGauge = register_int_gauge!(
        "hashgraph_election_round",
        "Round currently being voted on"
    )
    .expect("Failed to create ELECTION_ROUND metric");
}

#[cfg(feature = "metrics")]
pub fn record_event_added() {
    EVENTS_ADDED.inc();
}

/// Record a decided round and the number of events it ordered
#[cfg(feature = "metrics")]
pub fn record_round_decided(round: u64, consensus_events: usize) {
    ROUNDS_DECIDED.inc();
    CONSENSUS_EVENTS.inc_by(consensus_events as u64);
    ELECTION_ROUND.set(round as i64 + 1);
}

#[cfg(feature = "metrics")]
pub fn record_coin_vote() {
    COIN_VOTES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_stalled_round() {
    STALLED_ROUNDS.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_event_added() {}

#[cfg(not(feature = "metrics"))]
pub fn record_round_decided(_round: u64, _consensus_events: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_coin_vote() {}

#[cfg(not(feature = "metrics"))]
pub fn record_stalled_round() {}

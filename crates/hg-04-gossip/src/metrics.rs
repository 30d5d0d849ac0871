//! # Gossip Metrics
//!
//! Prometheus metrics for sync sessions, behind the `metrics` feature.
//!
//! ## Metrics Exported
//!
//! - `gossip_syncs_total` - Sync sessions completed as initiator
//! - `gossip_sync_failures_total` - Sessions that timed out or failed
//! - `gossip_events_received_total` - Events received from peers
//! - `gossip_events_sent_total` - Events sent to peers
//! - `gossip_fallen_behind` - 1 while this node has fallen behind its peers

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref SYNCS: IntCounter = register_int_counter!(
        "gossip_syncs_total",
        "Total number of completed sync sessions"
    )
    .expect("Failed to create SYNCS metric");

    pub static ref SYNC_FAILURES: IntCounter = register_int_counter!(
        "gossip_sync_failures_total",
        "Total number of failed sync sessions"
    )
    .expect("Failed to create SYNC_FAILURES metric");

    pub static ref EVENTS_RECEIVED: IntCounter = register_int_counter!(
        "gossip_events_received_total",
        "Total number of events received from peers"
    )
    .expect("Failed to create EVENTS_RECEIVED metric");

    pub static ref EVENTS_SENT: IntCounter = register_int_counter!(
        "gossip_events_sent_total",
        "Total number of events sent to peers"
    )
    .expect("Failed to create EVENTS_SENT metric");

    pub static ref FALLEN_BEHIND: IntGauge = register_int_gauge!(
        "gossip_fallen_behind",
        "Whether this node has fallen behind its peers"
    )
    .expect("Failed to create FALLEN_BEHIND metric");
}

#[cfg(feature = "metrics")]
pub fn record_sync_completed(received: usize, pushed: usize) {
    SYNCS.inc();
    EVENTS_RECEIVED.inc_by(received as u64);
    EVENTS_SENT.inc_by(pushed as u64);
}

#[cfg(feature = "metrics")]
pub fn record_sync_failure() {
    SYNC_FAILURES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_events_sent(count: usize) {
    EVENTS_SENT.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn set_fallen_behind(fallen_behind: bool) {
    FALLEN_BEHIND.set(i64::from(fallen_behind));
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_sync_completed(_received: usize, _pushed: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_sync_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_events_sent(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_fallen_behind(_fallen_behind: bool) {}

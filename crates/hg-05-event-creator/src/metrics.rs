//! # Event Creator Metrics
//!
//! Prometheus metrics for monitoring self-event creation.
//!
//! ## Metrics Exported
//!
//! - `creator_events_created_total` - Self-events created and submitted
//! - `creator_transactions_included_total` - Transactions placed in events
//! - `creator_creation_skipped_total` - Attempts held back, by reason
//! - `creator_pool_size` - Transactions waiting for an event

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref EVENTS_CREATED: IntCounter = register_int_counter!(
        "creator_events_created_total",
        "Total number of self-events created"
    )
    .expect("Failed to create EVENTS_CREATED metric");

    pub static ref TRANSACTIONS_INCLUDED: IntCounter = register_int_counter!(
        "creator_transactions_included_total",
        "Total number of transactions placed in self-events"
    )
    .expect("Failed to create TRANSACTIONS_INCLUDED metric");

    pub static ref CREATION_SKIPPED: IntCounterVec = register_int_counter_vec!(
        "creator_creation_skipped_total",
        "Creation attempts held back",
        &["reason"]
    )
    .expect("Failed to create CREATION_SKIPPED metric");

    pub static ref POOL_SIZE: IntGauge = register_int_gauge!(
        "creator_pool_size",
        "Transactions waiting for an event"
    )
    .expect("Failed to create POOL_SIZE metric");
}

#[cfg(feature = "metrics")]
pub fn record_event_created(transactions: usize) {
    EVENTS_CREATED.inc();
    TRANSACTIONS_INCLUDED.inc_by(transactions as u64);
}

#[cfg(feature = "metrics")]
pub fn record_skipped(reason: &str) {
    CREATION_SKIPPED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn set_pool_size(size: usize) {
    POOL_SIZE.set(size as i64);
}

#[cfg(not(feature = "metrics"))]
pub fn record_event_created(_transactions: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_skipped(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn set_pool_size(_size: usize) {}

//! # Event Intake Metrics
//!
//! Prometheus metrics for the intake pipeline, behind the `metrics` feature.
//!
//! ## Metrics Exported
//!
//! - `intake_events_accepted_total` - Events inserted into consensus
//! - `intake_events_duplicate_total` - Events already known
//! - `intake_events_invalid_total` - Events rejected by validation
//! - `intake_events_ancient_total` - Events dropped as ancient
//! - `intake_orphans_discarded_total` - Orphans evicted, expired or made ancient
//! - `intake_orphan_buffer_size` - Orphans currently buffered
//! - `intake_durability_failures_total` - Journal failures that halted intake

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref EVENTS_ACCEPTED: IntCounter = register_int_counter!(
        "intake_events_accepted_total",
        "Total number of events inserted into consensus"
    )
    .expect("Failed to create EVENTS_ACCEPTED metric");

    pub static ref EVENTS_DUPLICATE: IntCounter = register_int_counter!(
        "intake_events_duplicate_total",
        "Total number of duplicate events received"
    )
    .expect("Failed to create EVENTS_DUPLICATE metric");

    pub static ref EVENTS_INVALID: IntCounter = register_int_counter!(
        "intake_events_invalid_total",
        "Total number of events rejected by validation"
    )
    .expect("Failed to create EVENTS_INVALID metric");

    pub static ref EVENTS_ANCIENT: IntCounter = register_int_counter!(
        "intake_events_ancient_total",
        "Total number of ancient events dropped"
    )
    .expect("Failed to create EVENTS_ANCIENT metric");

    pub static ref ORPHANS_DISCARDED: IntCounter = register_int_counter!(
        "intake_orphans_discarded_total",
        "Total number of orphans evicted, expired or made ancient"
    )
    .expect("Failed to create ORPHANS_DISCARDED metric");

    pub static ref ORPHAN_BUFFER_SIZE: IntGauge = register_int_gauge!(
        "intake_orphan_buffer_size",
        "Orphans currently buffered"
    )
    .expect("Failed to create ORPHAN_BUFFER_SIZE metric");

    pub static ref DURABILITY_FAILURES: IntCounter = register_int_counter!(
        "intake_durability_failures_total",
        "Journal failures that halted intake"
    )
    .expect("Failed to create DURABILITY_FAILURES metric");
}

#[cfg(feature = "metrics")]
pub fn record_accepted() {
    EVENTS_ACCEPTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_duplicate() {
    EVENTS_DUPLICATE.inc();
}

#[cfg(feature = "metrics")]
pub fn record_invalid() {
    EVENTS_INVALID.inc();
}

#[cfg(feature = "metrics")]
pub fn record_ancient() {
    EVENTS_ANCIENT.inc();
}

#[cfg(feature = "metrics")]
pub fn record_orphans_discarded(count: usize) {
    ORPHANS_DISCARDED.inc_by(count as u64);
}

#[cfg(feature = "metrics")]
pub fn set_orphan_buffer_size(size: usize) {
    ORPHAN_BUFFER_SIZE.set(size as i64);
}

#[cfg(feature = "metrics")]
pub fn record_durability_failure() {
    DURABILITY_FAILURES.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_accepted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_duplicate() {}

#[cfg(not(feature = "metrics"))]
pub fn record_invalid() {}

#[cfg(not(feature = "metrics"))]
pub fn record_ancient() {}

#[cfg(not(feature = "metrics"))]
pub fn record_orphans_discarded(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_orphan_buffer_size(_size: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_durability_failure() {}

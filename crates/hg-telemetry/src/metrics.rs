//! Node-level Prometheus metrics.
//!
//! Subsystem crates register their own metrics in the default Prometheus
//! registry when built with their `metrics` feature. Metrics owned by the
//! runtime live in `REGISTRY`; `encode_metrics` exports both.

use crate::TelemetryError;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

lazy_static! {
    /// Node metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Consensus rounds delivered to the application
    pub static ref ROUNDS_DELIVERED: IntCounterVec = IntCounterVec::new(
        Opts::new("hg_node_rounds_delivered_total", "Consensus rounds delivered"),
        &["node"]
    ).expect("metric creation failed");

    /// Transactions in delivered rounds
    pub static ref TRANSACTIONS_ORDERED: IntCounterVec = IntCounterVec::new(
        Opts::new("hg_node_transactions_ordered_total", "Transactions given a consensus order"),
        &["node"]
    ).expect("metric creation failed");

    /// Round of the latest platform state
    pub static ref STATE_ROUND: IntGaugeVec = IntGaugeVec::new(
        Opts::new("hg_node_state_round", "Round of the latest platform state"),
        &["node"]
    ).expect("metric creation failed");

    /// Events re-inserted from the preconsensus stream at startup
    pub static ref EVENTS_REPLAYED: IntCounterVec = IntCounterVec::new(
        Opts::new("hg_node_events_replayed_total", "Events replayed from the preconsensus stream"),
        &["node"]
    ).expect("metric creation failed");
}

/// Register the node metrics with `REGISTRY`. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ROUNDS_DELIVERED.clone()),
        Box::new(TRANSACTIONS_ORDERED.clone()),
        Box::new(STATE_ROUND.clone()),
        Box::new(EVENTS_REPLAYED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Record a delivered round for `node`.
pub fn record_round_delivered(node: &str, round: u64, transactions: usize) {
    ROUNDS_DELIVERED.with_label_values(&[node]).inc();
    TRANSACTIONS_ORDERED
        .with_label_values(&[node])
        .inc_by(transactions as u64);
    STATE_ROUND.with_label_values(&[node]).set(round as i64);
}

pub fn record_events_replayed(node: &str, events: usize) {
    EVENTS_REPLAYED
        .with_label_values(&[node])
        .inc_by(events as u64);
}

/// Encode node and subsystem metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut metric_families = REGISTRY.gather();
    metric_families.extend(prometheus::gather());
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

//! Intake configuration

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeConfig {
    pub max_transactions_per_event: usize,
    pub max_transaction_bytes_per_event: usize,
    /// Orphans buffered at once; the oldest is evicted beyond this.
    pub max_orphans: usize,
    /// Orphans older than this are discarded.
    pub orphan_ttl: Duration,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_transactions_per_event: 1024,
            max_transaction_bytes_per_event: 245_760,
            max_orphans: 10_000,
            orphan_ttl: Duration::from_secs(60),
        }
    }
}

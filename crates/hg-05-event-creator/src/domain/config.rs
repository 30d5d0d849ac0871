//! Event creator configuration

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorConfig {
    /// How often the creation loop considers making an event.
    pub creation_interval: Duration,
    /// Create an event at least this often, even without transactions.
    pub heartbeat: Duration,
    /// Hold off while this many submissions are queued at intake.
    pub max_intake_queue: usize,
    /// Hold off while this many created rounds are still undecided.
    pub max_undecided_rounds: u64,
    pub max_transactions_per_event: usize,
    pub max_transaction_bytes_per_event: usize,
    pub pool: PoolConfig,
}

impl Default for CreatorConfig {
    fn default() -> Self {
        Self {
            creation_interval: Duration::from_millis(20),
            heartbeat: Duration::from_millis(500),
            max_intake_queue: 32,
            max_undecided_rounds: 20,
            max_transactions_per_event: 1024,
            max_transaction_bytes_per_event: 245_760,
            pool: PoolConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_transactions: usize,
    pub max_bytes: usize,
    pub max_transaction_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 100_000,
            max_bytes: 64 * 1024 * 1024,
            max_transaction_size: 6_144,
        }
    }
}

//! Gossip configuration

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct GossipConfig {
    /// Pause between sync attempts of the gossip loop.
    pub sync_interval: Duration,
    /// Deadline of a whole sync exchange with one peer.
    pub sync_timeout: Duration,
    /// Concurrent sync sessions.
    pub max_concurrent_syncs: usize,
    /// Send other creators' events only once known this long.
    pub filter_likely_duplicates: bool,
    pub non_ancestor_filter_threshold: Duration,
    /// Fraction of peers that must be ahead of our window by more than the
    /// non-ancient rounds before this node counts as fallen behind.
    pub fallen_behind_threshold: f64,
    pub reputation: ReputationConfig,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_millis(50),
            sync_timeout: Duration::from_secs(2),
            max_concurrent_syncs: 4,
            filter_likely_duplicates: false,
            non_ancestor_filter_threshold: Duration::from_secs(3),
            fallen_behind_threshold: 0.5,
            reputation: ReputationConfig::default(),
        }
    }
}

/// Peer reputation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationConfig {
    pub initial: f64,
    pub max: f64,
    /// Peers at or below this are never selected.
    pub ban_threshold: f64,
    /// Added per successful sync.
    pub success_reward: f64,
    /// Subtracted per timeout or transport failure.
    pub failure_penalty: f64,
    /// Subtracted per invalid event received from the peer.
    pub invalid_event_penalty: f64,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            initial: 100.0,
            max: 200.0,
            ban_threshold: 10.0,
            success_reward: 1.0,
            failure_penalty: 5.0,
            invalid_event_penalty: 25.0,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
        }
    }
}

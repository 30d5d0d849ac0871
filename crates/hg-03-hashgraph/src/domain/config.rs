//! Consensus tuning parameters

use serde::{Deserialize, Serialize};

/// Virtual-voting configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Rounds kept non-ancient behind the latest consensus round.
    pub rounds_non_ancient: u64,
    /// Every `coin_freq`-th voting round is a coin round.
    pub coin_freq: u64,
    /// Minimum spacing between consecutive consensus transaction timestamps.
    pub min_timestamp_increment_nanos: u64,
    /// Undecided-round lag that raises a stalled-round alert.
    pub stalled_round_threshold: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            rounds_non_ancient: 26,
            coin_freq: 12,
            min_timestamp_increment_nanos: 1_000,
            stalled_round_threshold: 10,
        }
    }
}

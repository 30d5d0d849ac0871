//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Every subsystem keeps its own `*Config` with defaults; `load_config`
//! overrides the commonly tuned values from `HG_*` environment variables.

use hg_02_event_intake::IntakeConfig;
use hg_03_hashgraph::ConsensusConfig;
use hg_04_gossip::GossipConfig;
use hg_05_event_creator::CreatorConfig;
use hg_06_pces::PcesConfig;
use hg_07_platform_state::StateConfig;
use hg_telemetry::{parse_flag, TelemetryConfig};
use shared_types::NodeId;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Members of the local network, all run in this process.
    pub node_count: usize,
    /// Key material every node identity is derived from.
    pub network_secret: Vec<u8>,
    /// Root of the per-node data directories.
    pub data_dir: PathBuf,
    /// Stop after this long; run until Ctrl+C when `None`.
    pub run_for: Option<Duration>,
    /// Synthetic transactions submitted per node per second.
    pub transactions_per_second: u32,
    /// Capacity of each node's consensus round channel.
    pub round_channel_capacity: usize,
    pub consensus: ConsensusConfig,
    pub intake: IntakeConfig,
    pub gossip: GossipConfig,
    pub creator: CreatorConfig,
    pub pces: PcesConfig,
    pub state: StateConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_count: 4,
            network_secret: b"hashgraph local network".to_vec(),
            data_dir: PathBuf::from("./data"),
            run_for: None,
            transactions_per_second: 20,
            round_channel_capacity: 1024,
            consensus: ConsensusConfig::default(),
            intake: IntakeConfig::default(),
            gossip: GossipConfig::default(),
            creator: CreatorConfig::default(),
            pces: PcesConfig::default(),
            state: StateConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Configuration rooted at `data_dir`, otherwise default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn node_dir(&self, node: NodeId) -> PathBuf {
        self.data_dir.join(format!("node-{}", node.0))
    }

    /// PCES settings for one node.
    pub fn pces_for(&self, node: NodeId) -> PcesConfig {
        PcesConfig {
            directory: self.node_dir(node).join("pces"),
            ..self.pces.clone()
        }
    }

    /// Platform state settings for one node.
    pub fn state_for(&self, node: NodeId) -> StateConfig {
        StateConfig {
            directory: self.node_dir(node).join("state"),
            ..self.state.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count == 0 {
            return Err(ConfigError::Invalid {
                var: "HG_NODE_COUNT",
                value: "0".into(),
            });
        }
        if self.consensus.coin_freq < 2 {
            return Err(ConfigError::Invalid {
                var: "HG_COIN_FREQ",
                value: self.consensus.coin_freq.to_string(),
            });
        }
        if self.consensus.rounds_non_ancient == 0 {
            return Err(ConfigError::Invalid {
                var: "HG_ROUNDS_NON_ANCIENT",
                value: "0".into(),
            });
        }
        if self.network_secret.is_empty() {
            return Err(ConfigError::Invalid {
                var: "HG_NETWORK_SECRET",
                value: String::new(),
            });
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_from(|key| std::env::var(key).ok())
}

/// Load configuration through `lookup`, starting from defaults.
///
/// | Variable | Field |
/// |----------|-------|
/// | `HG_NODE_COUNT` | `node_count` |
/// | `HG_DATA_DIR` | `data_dir` |
/// | `HG_NETWORK_SECRET` | `network_secret` (hex) |
/// | `HG_ROUNDS_NON_ANCIENT` | `consensus.rounds_non_ancient` |
/// | `HG_COIN_FREQ` | `consensus.coin_freq` |
/// | `HG_SYNC_TIMEOUT_MS` | `gossip.sync_timeout` |
/// | `HG_HEARTBEAT_MS` | `creator.heartbeat` |
/// | `HG_CHECKPOINT_INTERVAL` | `state.checkpoint_interval` |
/// | `HG_TPS` | `transactions_per_second` |
/// | `HG_RUN_SECS` | `run_for` |
/// | `HG_LOG_LEVEL` | `telemetry.log_level` |
/// | `HG_JSON_LOGS` | `telemetry.json_logs` |
pub fn load_config_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<NodeConfig, ConfigError> {
    let mut config = NodeConfig::default();

    if let Some(count) = parse(&lookup, "HG_NODE_COUNT")? {
        config.node_count = count;
    }
    if let Some(dir) = lookup("HG_DATA_DIR") {
        config.data_dir = Path::new(&dir).to_path_buf();
    }
    if let Some(secret) = lookup("HG_NETWORK_SECRET") {
        config.network_secret = hex::decode(secret.trim()).map_err(|_| ConfigError::Invalid {
            var: "HG_NETWORK_SECRET",
            value: secret.clone(),
        })?;
    }
    if let Some(rounds) = parse(&lookup, "HG_ROUNDS_NON_ANCIENT")? {
        config.consensus.rounds_non_ancient = rounds;
    }
    if let Some(freq) = parse(&lookup, "HG_COIN_FREQ")? {
        config.consensus.coin_freq = freq;
    }
    if let Some(ms) = parse(&lookup, "HG_SYNC_TIMEOUT_MS")? {
        config.gossip.sync_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = parse(&lookup, "HG_HEARTBEAT_MS")? {
        config.creator.heartbeat = Duration::from_millis(ms);
    }
    if let Some(interval) = parse(&lookup, "HG_CHECKPOINT_INTERVAL")? {
        config.state.checkpoint_interval = interval;
    }
    if let Some(tps) = parse(&lookup, "HG_TPS")? {
        config.transactions_per_second = tps;
    }
    if let Some(secs) = parse(&lookup, "HG_RUN_SECS")? {
        config.run_for = Some(Duration::from_secs(secs));
    }
    if let Some(level) = lookup("HG_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
        config.telemetry.log_level = level;
    }
    if let Some(json) = lookup("HG_JSON_LOGS") {
        config.telemetry.json_logs = parse_flag(&json);
    }

    config.validate()?;
    Ok(config)
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = load_config_from(env(&[])).unwrap();
        assert_eq!(config.node_count, 4);
        assert_eq!(config.consensus.rounds_non_ancient, 26);
        assert_eq!(config.run_for, None);
    }

    #[test]
    fn test_env_overrides() {
        let config = load_config_from(env(&[
            ("HG_NODE_COUNT", "7"),
            ("HG_DATA_DIR", "/tmp/hg"),
            ("HG_COIN_FREQ", "10"),
            ("HG_SYNC_TIMEOUT_MS", "250"),
            ("HG_HEARTBEAT_MS", "40"),
            ("HG_RUN_SECS", "3"),
            ("HG_JSON_LOGS", "true"),
            ("HG_NETWORK_SECRET", "0a0b"),
        ]))
        .unwrap();
        assert_eq!(config.node_count, 7);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/hg"));
        assert_eq!(config.consensus.coin_freq, 10);
        assert_eq!(config.gossip.sync_timeout, Duration::from_millis(250));
        assert_eq!(config.creator.heartbeat, Duration::from_millis(40));
        assert_eq!(config.run_for, Some(Duration::from_secs(3)));
        assert!(config.telemetry.json_logs);
        assert_eq!(config.network_secret, vec![0x0a, 0x0b]);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            load_config_from(env(&[("HG_NODE_COUNT", "four")])).unwrap_err(),
            ConfigError::Invalid {
                var: "HG_NODE_COUNT",
                value: "four".into()
            }
        );
        assert!(load_config_from(env(&[("HG_NODE_COUNT", "0")])).is_err());
        assert!(load_config_from(env(&[("HG_COIN_FREQ", "1")])).is_err());
        assert!(load_config_from(env(&[("HG_NETWORK_SECRET", "zz")])).is_err());
    }

    #[test]
    fn test_per_node_directories() {
        let config = NodeConfig::with_data_dir("/data");
        assert_eq!(config.pces_for(NodeId(2)).directory, PathBuf::from("/data/node-2/pces"));
        assert_eq!(config.state_for(NodeId(2)).directory, PathBuf::from("/data/node-2/state"));
    }
}

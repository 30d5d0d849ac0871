//! # Live Network
//!
//! Four complete nodes (gossip, creator, intake, journal, state) run over
//! the in-process network with the system clock. Every node must deliver
//! the same rounds, and keep doing so after all of them restart from disk.

#[cfg(test)]
mod tests {
    use hg_07_platform_state::PlatformState;
    use node_runtime::adapters::LocalNetwork;
    use node_runtime::{GenesisBuilder, GenesisConfig, HashgraphNode, NodeConfig};
    use parking_lot::Mutex;
    use shared_types::{ConsensusRound, Hash, SystemTimeSource, TimeSource};
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    const DEADLINE: Duration = Duration::from_secs(60);

    type Delivered = Arc<Mutex<BTreeMap<u64, Vec<Hash>>>>;

    fn config(dir: &Path) -> NodeConfig {
        let mut config = NodeConfig::with_data_dir(dir);
        config.node_count = 4;
        config.creator.heartbeat = Duration::from_millis(50);
        config.gossip.sync_interval = Duration::from_millis(20);
        config.state.checkpoint_interval = 2;
        config
    }

    fn collect(mut rounds: mpsc::Receiver<ConsensusRound>, delivered: Delivered) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(round) = rounds.recv().await {
                let hashes = round.events.iter().map(|e| e.event.hash()).collect();
                delivered.lock().insert(round.round, hashes);
            }
        })
    }

    async fn start_all(
        config: &NodeConfig,
    ) -> (Vec<HashgraphNode>, Vec<Delivered>, Vec<JoinHandle<()>>) {
        let genesis = GenesisBuilder::new(GenesisConfig::uniform(
            &config.network_secret,
            config.node_count,
        ))
        .build()
        .unwrap();
        let network = LocalNetwork::new();
        let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);

        let mut nodes = Vec::new();
        let mut delivered = Vec::new();
        let mut collectors = Vec::new();
        for id in genesis.members() {
            let (node, rounds) =
                HashgraphNode::start(id, config, &genesis, network.clone(), time.clone())
                    .await
                    .unwrap();
            let log = Delivered::default();
            collectors.push(collect(rounds, log.clone()));
            delivered.push(log);
            nodes.push(node);
        }
        (nodes, delivered, collectors)
    }

    async fn wait_for_round(nodes: &[HashgraphNode], round: u64) {
        tokio::time::timeout(DEADLINE, async {
            loop {
                if nodes.iter().all(|n| n.state().round >= round) {
                    return;
                }
                for (i, node) in nodes.iter().enumerate() {
                    let transaction = format!("load-{i}-{}", node.state().version).into_bytes();
                    let _ = node.submit_transaction(transaction);
                }
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
        })
        .await
        .expect("every node reached the round before the deadline");
    }

    fn assert_agreement(delivered: &[Delivered]) {
        let logs: Vec<BTreeMap<u64, Vec<Hash>>> =
            delivered.iter().map(|d| d.lock().clone()).collect();
        let mut compared = 0;
        for (round, events) in &logs[0] {
            for other in &logs[1..] {
                if let Some(theirs) = other.get(round) {
                    assert_eq!(events, theirs, "nodes disagree on round {round}");
                    compared += 1;
                }
            }
        }
        assert!(compared > 0);
    }

    async fn shutdown_all(
        nodes: Vec<HashgraphNode>,
        collectors: Vec<JoinHandle<()>>,
    ) -> Vec<Arc<PlatformState>> {
        let mut states = Vec::new();
        for node in nodes {
            states.push(node.state());
            node.shutdown().await;
        }
        for collector in collectors {
            collector.abort();
        }
        states
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nodes_agree_and_resume_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let (nodes, delivered, collectors) = start_all(&config).await;
        wait_for_round(&nodes, 4).await;
        assert!(nodes.iter().all(|n| !n.is_halted()));
        assert_agreement(&delivered);
        let stopped = shutdown_all(nodes, collectors).await;

        let (nodes, delivered, collectors) = start_all(&config).await;
        for (node, before) in nodes.iter().zip(&stopped) {
            let resumed = node.state();
            assert!(resumed.round >= before.round);
            if resumed.round == before.round {
                assert_eq!(resumed.running_hash, before.running_hash);
            }
        }

        let target = stopped.iter().map(|s| s.round).max().unwrap_or(0) + 2;
        wait_for_round(&nodes, target).await;
        tokio::time::timeout(DEADLINE, async {
            while delivered.iter().any(|d| d.lock().is_empty()) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("every node delivered a round after restarting");
        assert_agreement(&delivered);
        for (log, before) in delivered.iter().zip(&stopped) {
            let first = log.lock().keys().next().copied();
            assert!(first.map_or(false, |r| r > before.round));
        }
        shutdown_all(nodes, collectors).await;
    }
}

//! # Local Cluster
//!
//! Runs every member of the genesis roster in this process over a
//! `LocalNetwork`, feeds each node synthetic transactions and logs the
//! rounds it delivers.

use crate::adapters::LocalNetwork;
use crate::container::NodeConfig;
use crate::genesis::{Genesis, GenesisBuilder, GenesisConfig};
use crate::wiring::{HashgraphNode, RuntimeError};
use hg_05_event_creator::{CreatorError, EventCreatorApi, EventCreatorService};
use hg_telemetry::log_round_event;
use shared_types::{short_hash, ConsensusRound, Hash, NodeId, SystemTimeSource, TimeSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// What one node delivered while the cluster ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeReport {
    pub node: NodeId,
    pub rounds_delivered: u64,
    pub transactions_delivered: u64,
    pub state_round: u64,
    pub running_hash: Hash,
}

pub struct LocalCluster {
    genesis: Genesis,
    network: Arc<LocalNetwork>,
    nodes: Vec<HashgraphNode>,
    consumers: Vec<JoinHandle<NodeReport>>,
    load: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl LocalCluster {
    pub async fn start(config: NodeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let genesis = GenesisBuilder::new(GenesisConfig::uniform(
            &config.network_secret,
            config.node_count,
        ))
        .build()?;
        let network = LocalNetwork::new();
        let time: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut nodes = Vec::with_capacity(config.node_count);
        let mut consumers = Vec::with_capacity(config.node_count);
        let mut load = Vec::with_capacity(config.node_count);
        for id in genesis.members() {
            let (node, rounds) =
                HashgraphNode::start(id, &config, &genesis, network.clone(), time.clone()).await?;
            consumers.push(tokio::spawn(consume_rounds(id, rounds, shutdown_rx.clone())));
            if config.transactions_per_second > 0 {
                load.push(spawn_load(
                    node.creator().clone(),
                    config.transactions_per_second,
                    shutdown_rx.clone(),
                ));
            }
            nodes.push(node);
        }

        info!(
            nodes = nodes.len(),
            data_dir = %config.data_dir.display(),
            "Local cluster started"
        );
        Ok(Self {
            genesis,
            network,
            nodes,
            consumers,
            load,
            shutdown_tx,
        })
    }

    pub fn nodes(&self) -> &[HashgraphNode] {
        &self.nodes
    }

    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }

    pub fn network(&self) -> &Arc<LocalNetwork> {
        &self.network
    }

    /// Stop load and consumers, then every node. Returns one report per
    /// node.
    pub async fn shutdown(self) -> Vec<NodeReport> {
        let _ = self.shutdown_tx.send(true);
        for task in self.load {
            let _ = task.await;
        }
        let mut reports = Vec::with_capacity(self.consumers.len());
        for (consumer, node) in self.consumers.into_iter().zip(self.nodes) {
            let mut report = consumer.await.unwrap_or_default();
            let state = node.state();
            report.node = node.id();
            report.state_round = state.round;
            report.running_hash = state.running_hash;
            node.shutdown().await;
            reports.push(report);
        }
        info!("Local cluster stopped");
        reports
    }
}

async fn consume_rounds(
    node: NodeId,
    mut rounds: mpsc::Receiver<ConsensusRound>,
    mut shutdown: watch::Receiver<bool>,
) -> NodeReport {
    let mut report = NodeReport {
        node,
        ..NodeReport::default()
    };
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            round = rounds.recv() => {
                let Some(round) = round else { break };
                report.rounds_delivered += 1;
                report.transactions_delivered += round.transaction_count() as u64;
                log_round_event!(
                    info,
                    "consensus",
                    "Round delivered",
                    node,
                    round.round,
                    events = round.events.len(),
                    transactions = round.transaction_count(),
                    judges = round.judges.len()
                );
                if let Some(last) = round.events.last() {
                    debug!(
                        node = %node,
                        last_event = %short_hash(&last.event.hash()),
                        "Round tail"
                    );
                }
            }
        }
    }
    report
}

/// Submit `tps` synthetic transactions per second to `creator`.
fn spawn_load(
    creator: Arc<EventCreatorService>,
    tps: u32,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(1) / tps.max(1);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sequence: u64 = 0;
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    let mut transaction = creator.node_id().0.to_le_bytes().to_vec();
                    transaction.extend_from_slice(&sequence.to_le_bytes());
                    transaction.extend_from_slice(&rand::random::<[u8; 16]>());
                    sequence += 1;
                    match creator.submit_transaction(transaction) {
                        Ok(()) => {}
                        Err(CreatorError::PoolFull) => {
                            debug!(node = %creator.node_id(), "Transaction pool full");
                        }
                        Err(e) => {
                            debug!(node = %creator.node_id(), error = %e, "Transaction refused");
                        }
                    }
                }
            }
        }
    })
}

//! # Hashgraph Node
//!
//! Builds one node from its configuration and runs its background tasks.
//!
//! ## Startup Sequence
//!
//! 1. Open the state store and load the latest checkpoint (or genesis)
//! 2. Lock the PCES directory
//! 3. Build intake over a fresh hashgraph, then the creator
//! 4. Load the checkpoint's consensus snapshot
//! 5. Replay the PCES from the checkpoint's ancient threshold
//! 6. Build gossip and join the network
//! 7. Spawn the gossip and creation loops

use crate::adapters::{
    CreatorIntakeLink, CreatorSink, Deferred, GossipPenalizer, IntakeSubmitter, LocalNetwork,
    NodeIntake, NodeStateService, PcesJournal, PruneFloor, RoundObserver, ShadowgraphSink,
};
use crate::container::NodeConfig;
use crate::genesis::Genesis;
use crate::wiring::RuntimeError;
use hg_02_event_intake::{
    Ed25519SignatureVerifier, EventIntakeApi, EventIntakeService, IntakeError, IntakePorts,
    IntakeStatus,
};
use hg_03_hashgraph::Hashgraph;
use hg_04_gossip::{GossipService, Shadowgraph};
use hg_05_event_creator::{CreatorResult, EventCreatorApi, EventCreatorService};
use hg_06_pces::{replay, PcesWriter};
use hg_07_platform_state::{FileStateStore, PlatformState, PlatformStateService};
use shared_types::{ConsensusRound, NodeId, TimeSource};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct HashgraphNode {
    id: NodeId,
    intake: Arc<NodeIntake>,
    gossip: Arc<GossipService>,
    creator: Arc<EventCreatorService>,
    state: Arc<NodeStateService>,
    journal: Arc<PcesJournal>,
    network: Arc<LocalNetwork>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl HashgraphNode {
    /// Start node `id`, resuming from its data directory if it has one.
    ///
    /// Returns the node and the receiver of its consensus rounds.
    pub async fn start(
        id: NodeId,
        config: &NodeConfig,
        genesis: &Genesis,
        network: Arc<LocalNetwork>,
        time: Arc<dyn TimeSource>,
    ) -> Result<(Self, mpsc::Receiver<ConsensusRound>), RuntimeError> {
        let signer = genesis.signer(id).ok_or(RuntimeError::UnknownNode(id))?;
        let state_config = config.state_for(id);

        // Step 1: platform state
        let store =
            FileStateStore::new(&state_config.directory, state_config.retained_checkpoints)?;
        let checkpoint_interval = state_config.checkpoint_interval;
        let state = Arc::new(PlatformStateService::open(
            store,
            state_config,
            genesis.roster_hash(),
        )?);
        let resumed = state.current();

        // Step 2: journal
        let pces_config = config.pces_for(id);
        let pces_dir = pces_config.directory.clone();
        let floor = PruneFloor::new(resumed.event_window.ancient_threshold);
        let writer = PcesWriter::open(pces_config, resumed.round)?;
        let journal = Arc::new(PcesJournal::new(writer, floor.clone()));

        // Step 3: intake and creator
        let (round_tx, round_rx) = mpsc::channel(config.round_channel_capacity.max(1));
        let shadowgraph = Arc::new(Shadowgraph::new());
        let gossip_cell = Deferred::<GossipService>::new();
        let creator_cell = Deferred::<EventCreatorService>::new();
        let ports = IntakePorts {
            verifier: Arc::new(Ed25519SignatureVerifier),
            journal: journal.clone(),
            observer: Arc::new(RoundObserver::new(
                id,
                state.clone(),
                round_tx,
                floor,
                checkpoint_interval,
            )),
            penalizer: Arc::new(GossipPenalizer::new(gossip_cell.clone())),
            sinks: vec![
                Arc::new(ShadowgraphSink::new(shadowgraph.clone())),
                Arc::new(CreatorSink::new(creator_cell.clone())),
            ],
            time: time.clone(),
        };
        let rosters = genesis.rosters();
        let engine = Hashgraph::new(config.consensus.clone(), rosters.clone());
        let intake = Arc::new(EventIntakeService::new(
            engine,
            rosters,
            config.intake.clone(),
            ports,
        ));
        let creator = Arc::new(EventCreatorService::new(
            config.creator.clone(),
            signer,
            Arc::new(CreatorIntakeLink::new(intake.clone())),
            time.clone(),
        ));
        creator_cell.set(creator.clone());

        // Step 4: consensus snapshot
        if !resumed.is_genesis() {
            intake.load_snapshot(&resumed.snapshot).await;
        }

        // Step 5: PCES replay
        let replayed = replay_journal(id, &intake, &pces_dir, &resumed).await?;

        // Step 6: gossip
        let gossip = Arc::new(GossipService::new(
            id,
            config.gossip.clone(),
            genesis.members(),
            shadowgraph,
            network.clone(),
            Arc::new(IntakeSubmitter::new(intake.clone())),
            time,
        ));
        gossip_cell.set(gossip.clone());
        network.register(id, gossip.clone());

        // Step 7: background tasks
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let tasks = vec![
            gossip.clone().spawn(shutdown_rx.clone()),
            creator.clone().spawn(shutdown_rx),
        ];

        info!(
            node = %id,
            round = resumed.round,
            replayed,
            "Node started"
        );
        Ok((
            Self {
                id,
                intake,
                gossip,
                creator,
                state,
                journal,
                network,
                shutdown_tx,
                tasks,
            },
            round_rx,
        ))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Queue an application transaction on this node.
    pub fn submit_transaction(&self, transaction: Vec<u8>) -> CreatorResult<()> {
        self.creator.submit_transaction(transaction)
    }

    /// Latest platform state version.
    pub fn state(&self) -> Arc<PlatformState> {
        self.state.current()
    }

    pub async fn status(&self) -> IntakeStatus {
        self.intake.status().await
    }

    pub fn intake(&self) -> &Arc<NodeIntake> {
        &self.intake
    }

    pub fn gossip(&self) -> &Arc<GossipService> {
        &self.gossip
    }

    pub fn creator(&self) -> &Arc<EventCreatorService> {
        &self.creator
    }

    pub fn is_halted(&self) -> bool {
        self.intake.is_halted()
    }

    /// Stop the background tasks, leave the network, checkpoint the state
    /// and release the PCES directory.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(node = %self.id, error = %e, "Node task ended abnormally");
            }
        }
        self.network.unregister(self.id);
        if let Err(e) = self.state.checkpoint() {
            warn!(node = %self.id, error = %e, "Shutdown checkpoint failed");
        }
        self.journal.close();
        info!(node = %self.id, round = self.state.current().round, "Node stopped");
    }
}

async fn replay_journal(
    id: NodeId,
    intake: &NodeIntake,
    directory: &std::path::Path,
    resumed: &PlatformState,
) -> Result<usize, RuntimeError> {
    let outcome = replay(directory, resumed.event_window.ancient_threshold)?;
    let mut inserted = 0;
    for event in outcome.events {
        match intake.replay(event).await {
            Ok(result) if result.is_accepted() => inserted += 1,
            Ok(_) => {}
            Err(IntakeError::InvalidEvent(reason)) => {
                warn!(node = %id, %reason, "Skipping invalid journaled event");
            }
            Err(e) => return Err(e.into()),
        }
    }
    hg_telemetry::record_events_replayed(&id.to_string(), inserted);
    if outcome.damaged_segments > 0 {
        warn!(node = %id, damaged = outcome.damaged_segments, "Replayed a damaged PCES");
    }
    Ok(inserted)
}

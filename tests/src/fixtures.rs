//! # Test Fixtures
//!
//! Deterministic members, gossip DAGs and single-node pipelines shared by
//! the integration scenarios and the benchmarks.
//!
//! `DagBuilder` signs every event with a real member key and keeps a
//! reference hashgraph so birth rounds follow the same rule a live creator
//! uses: `max(pending round, parents' birth rounds)`.

use hg_01_roster::{Roster, RosterEntry, RosterHistory};
use hg_02_event_intake::{
    Ed25519SignatureVerifier, EventIntakeService, EventSink, IntakeConfig, IntakePorts,
    PeerPenalizer, ValidationError,
};
use hg_03_hashgraph::{ConsensusConfig, Hashgraph};
use hg_06_pces::{PcesConfig, PcesWriter};
use hg_07_platform_state::{FileStateStore, PlatformStateService, StateConfig};
use node_runtime::adapters::{NodeIntake, NodeStateService, PcesJournal, PruneFloor, RoundObserver};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared_crypto::{Ed25519KeyPair, EventSigner};
use shared_types::{
    ConsensusRound, EventWindow, GossipEvent, Hash, ManualTimeSource, NodeId, PlatformEvent,
    Timestamp, UnsignedEvent,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Nanoseconds between consecutive fixture events.
pub const EVENT_SPACING: Timestamp = 1_000_000;

/// Member `i` signs with seed `[i + 1; 32]`.
pub fn signers(members: u64) -> Vec<EventSigner> {
    (0..members)
        .map(|i| EventSigner::new(NodeId(i), Ed25519KeyPair::from_seed([i as u8 + 1; 32])))
        .collect()
}

/// Genesis roster history of the given signers, one unit of weight each.
pub fn rosters(signers: &[EventSigner]) -> RosterHistory {
    let roster = Roster::new(
        signers
            .iter()
            .map(|s| RosterEntry::new(s.node_id(), s.public_key(), 1))
            .collect(),
    )
    .expect("fixture roster is valid");
    RosterHistory::new(roster)
}

/// Builds a signed gossip DAG event by event.
pub struct DagBuilder {
    signers: Vec<EventSigner>,
    rosters: RosterHistory,
    latest: Vec<Option<GossipEvent>>,
    reference: Hashgraph,
    decided: Vec<ConsensusRound>,
    events: Vec<GossipEvent>,
    clock: Timestamp,
    rng: StdRng,
}

impl DagBuilder {
    pub fn new(members: u64, seed: u64) -> Self {
        let signers = signers(members);
        let rosters = rosters(&signers);
        let reference = Hashgraph::new(ConsensusConfig::default(), rosters.clone());
        Self {
            latest: vec![None; members as usize],
            signers,
            rosters,
            reference,
            decided: Vec::new(),
            events: Vec::new(),
            clock: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn members(&self) -> u64 {
        self.signers.len() as u64
    }

    pub fn rosters(&self) -> RosterHistory {
        self.rosters.clone()
    }

    /// Every event created so far, in creation (topological) order.
    pub fn events(&self) -> &[GossipEvent] {
        &self.events
    }

    /// Rounds the reference hashgraph decided while the DAG was built.
    pub fn decided(&self) -> &[ConsensusRound] {
        &self.decided
    }

    pub fn latest(&self, creator: u64) -> Option<&GossipEvent> {
        self.latest[creator as usize].as_ref()
    }

    /// Create the next event of `creator`, using the latest event of
    /// `other` as other-parent when there is one.
    pub fn create(&mut self, creator: u64, other: Option<u64>) -> GossipEvent {
        self.clock += EVENT_SPACING;
        let self_parent = self.latest[creator as usize].as_ref();
        let other_parent = other
            .filter(|o| *o != creator)
            .and_then(|o| self.latest[o as usize].as_ref());

        let pending = self.reference.event_window().pending_round();
        let birth_round = self_parent
            .iter()
            .chain(other_parent.iter())
            .map(|p| p.event.birth_round)
            .fold(pending, u64::max);
        let unsigned = UnsignedEvent {
            creator: NodeId(creator),
            self_parent: self_parent.map(descriptor),
            other_parent: other_parent.map(descriptor),
            time_created: self.clock,
            birth_round,
            transactions: vec![format!("tx-{creator}-{}", self.clock).into_bytes()],
        };
        let gossip = self.signers[creator as usize].sign(unsigned);

        let rounds = self
            .reference
            .add_event(PlatformEvent::new(gossip.clone()))
            .expect("fixture event accepted by the reference hashgraph");
        self.decided.extend(rounds);
        self.latest[creator as usize] = Some(gossip.clone());
        self.events.push(gossip.clone());
        gossip
    }

    /// Every member creates one event on top of its successor's latest.
    pub fn ring(&mut self) {
        let members = self.members();
        for creator in 0..members {
            self.create(creator, Some((creator + 1) % members));
        }
    }

    /// `count` events by random creators with random other-parents.
    pub fn random(&mut self, count: usize) {
        let members = self.members();
        for _ in 0..count {
            let creator = self.rng.gen_range(0..members);
            let other = (creator + self.rng.gen_range(1..members)) % members;
            self.create(creator, Some(other));
        }
    }
}

fn descriptor(event: &GossipEvent) -> shared_types::EventDescriptor {
    PlatformEvent::new(event.clone()).descriptor()
}

/// A different topological order of the same events.
pub fn shuffled_topological(events: &[GossipEvent], seed: u64) -> Vec<GossipEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pending: Vec<GossipEvent> = events.to_vec();
    let mut placed: HashSet<Hash> = HashSet::new();
    let mut out = Vec::with_capacity(events.len());
    while !pending.is_empty() {
        let ready: Vec<usize> = pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.event.parents().all(|p| placed.contains(&p.hash)))
            .map(|(i, _)| i)
            .collect();
        let &pick = ready.choose(&mut rng).expect("a topological successor exists");
        let event = pending.remove(pick);
        placed.insert(event.event.hash());
        out.push(event);
    }
    out
}

/// (consensus order, event hash, consensus timestamp) of every delivered
/// event.
pub fn consensus_order(rounds: &[ConsensusRound]) -> Vec<(u64, Hash, Timestamp)> {
    rounds
        .iter()
        .flat_map(|r| r.events.iter())
        .map(|e| (e.consensus_order, e.event.hash(), e.consensus_timestamp))
        .collect()
}

/// Remembers every penalty handed out by intake.
#[derive(Default)]
pub struct RecordingPenalizer {
    penalized: Mutex<Vec<(NodeId, ValidationError)>>,
}

impl RecordingPenalizer {
    pub fn penalized(&self) -> Vec<(NodeId, ValidationError)> {
        self.penalized.lock().clone()
    }
}

impl PeerPenalizer for RecordingPenalizer {
    fn penalize(&self, peer: NodeId, reason: &ValidationError) {
        self.penalized.lock().push((peer, reason.clone()));
    }
}

/// Remembers the hash of every inserted event, in insertion order.
#[derive(Default)]
pub struct RecordingSink {
    added: Mutex<Vec<Hash>>,
    window: Mutex<Option<EventWindow>>,
}

impl RecordingSink {
    pub fn added(&self) -> Vec<Hash> {
        self.added.lock().clone()
    }

    pub fn window(&self) -> Option<EventWindow> {
        *self.window.lock()
    }
}

impl EventSink for RecordingSink {
    fn on_event_added(&self, event: &PlatformEvent) {
        self.added.lock().push(event.hash());
    }

    fn on_window(&self, window: EventWindow) {
        *self.window.lock() = Some(window);
    }
}

/// One node's intake, journal and platform state over real storage,
/// without gossip or event creation.
pub struct Pipeline {
    pub intake: Arc<NodeIntake>,
    pub state: Arc<NodeStateService>,
    pub journal: Arc<PcesJournal>,
    pub penalizer: Arc<RecordingPenalizer>,
    pub sink: Arc<RecordingSink>,
    rounds: mpsc::Receiver<ConsensusRound>,
}

impl Pipeline {
    /// Build a pipeline rooted at `directory`, resuming any state and
    /// journal already there. Replay is left to the caller.
    pub fn open(directory: &Path, rosters: RosterHistory, checkpoint_interval: u64) -> Self {
        let roster_hash = rosters.latest().hash();
        let state_config = StateConfig {
            checkpoint_interval,
            retained_checkpoints: 3,
            directory: directory.join("state"),
        };
        let store = FileStateStore::new(&state_config.directory, state_config.retained_checkpoints)
            .expect("state directory opens");
        let state = Arc::new(
            PlatformStateService::open(store, state_config, roster_hash).expect("state loads"),
        );
        let resumed = state.current();

        let floor = PruneFloor::new(resumed.event_window.ancient_threshold);
        let pces = PcesConfig::with_directory(directory.join("pces"));
        let writer = PcesWriter::open(pces, resumed.round).expect("journal opens");
        let journal = Arc::new(PcesJournal::new(writer, floor.clone()));

        let (round_tx, rounds) = mpsc::channel(4096);
        let penalizer = Arc::new(RecordingPenalizer::default());
        let sink = Arc::new(RecordingSink::default());
        let ports = IntakePorts {
            verifier: Arc::new(Ed25519SignatureVerifier),
            journal: journal.clone(),
            observer: Arc::new(RoundObserver::new(
                NodeId(0),
                state.clone(),
                round_tx,
                floor,
                checkpoint_interval,
            )),
            penalizer: penalizer.clone(),
            sinks: vec![sink.clone()],
            time: Arc::new(ManualTimeSource::new(1)),
        };
        let engine = Hashgraph::new(ConsensusConfig::default(), rosters.clone());
        let intake = Arc::new(EventIntakeService::new(
            engine,
            rosters,
            IntakeConfig::default(),
            ports,
        ));
        Self {
            intake,
            state,
            journal,
            penalizer,
            sink,
            rounds,
        }
    }

    /// Rounds delivered since the last call.
    pub fn drain_rounds(&mut self) -> Vec<ConsensusRound> {
        let mut out = Vec::new();
        while let Ok(round) = self.rounds.try_recv() {
            out.push(round);
        }
        out
    }
}

//! # Event Intake Service
//!
//! Single-writer pipeline in front of the consensus engine.
//!
//! Stateless checks and signature verification run before the pipeline lock
//! is taken. Everything that reads or changes the known-event set, the orphan
//! buffer or the engine runs under the lock, one event at a time:
//!
//! ```text
//! ancient? → duplicate? → parents known? ──no──→ orphan buffer
//!                               │ yes
//!                               ↓
//!              journal (append + flush) → engine → observer / sinks
//!                               ↑                      │
//!                               └── released orphans ←─┘
//! ```

use crate::domain::{
    validate_internal, IntakeConfig, IntakeError, IntakeOutcome, IntakeResult, KnownEvents, Orphan,
    OrphanBuffer, ValidationError,
};
use crate::metrics;
use crate::ports::inbound::EventIntakeApi;
use crate::ports::outbound::{
    ConsensusObserver, EventJournal, EventSink, PeerPenalizer, SignatureVerifier,
};
use async_trait::async_trait;
use hg_01_roster::RosterHistory;
use hg_03_hashgraph::{ConsensusEngine, HashgraphError, LivenessStatus};
use shared_types::{
    ConsensusRound, ConsensusSnapshot, EventWindow, GossipEvent, NodeId, PlatformEvent, TimeSource,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Collaborators of the pipeline.
pub struct IntakePorts {
    pub verifier: Arc<dyn SignatureVerifier>,
    pub journal: Arc<dyn EventJournal>,
    pub observer: Arc<dyn ConsensusObserver>,
    pub penalizer: Arc<dyn PeerPenalizer>,
    pub sinks: Vec<Arc<dyn EventSink>>,
    pub time: Arc<dyn TimeSource>,
}

/// Point-in-time view of the pipeline and engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeStatus {
    pub event_window: EventWindow,
    pub election_round: u64,
    pub max_round: u64,
    pub liveness: LivenessStatus,
    pub orphans: usize,
    pub known_events: usize,
    /// Gossip can no longer supply the events this node needs.
    pub fallen_behind: bool,
}

struct Pipeline<E> {
    engine: E,
    known: KnownEvents,
    orphans: OrphanBuffer,
    window: EventWindow,
}

/// An event that made it into the engine.
struct Inserted {
    rounds: Vec<ConsensusRound>,
    released: Vec<PlatformEvent>,
}

struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct EventIntakeService<E: ConsensusEngine> {
    config: IntakeConfig,
    rosters: RosterHistory,
    ports: IntakePorts,
    pipeline: Mutex<Pipeline<E>>,
    halted: AtomicBool,
    fallen_behind: AtomicBool,
    pending: AtomicUsize,
}

impl<E: ConsensusEngine> EventIntakeService<E> {
    pub fn new(
        engine: E,
        rosters: RosterHistory,
        config: IntakeConfig,
        ports: IntakePorts,
    ) -> Self {
        let window = engine.event_window();
        let orphans = OrphanBuffer::new(config.max_orphans, config.orphan_ttl);
        Self {
            config,
            rosters,
            ports,
            pipeline: Mutex::new(Pipeline {
                engine,
                known: KnownEvents::new(),
                orphans,
                window,
            }),
            halted: AtomicBool::new(false),
            fallen_behind: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        }
    }

    /// True after a durability failure. A halted intake accepts nothing.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Record gossip's verdict on whether this node has fallen behind.
    pub fn set_fallen_behind(&self, fallen_behind: bool) {
        self.fallen_behind.store(fallen_behind, Ordering::SeqCst);
    }

    /// Restart consensus from a snapshot. Call before replaying the journal.
    pub async fn load_snapshot(&self, snapshot: &ConsensusSnapshot) {
        let mut pipeline = self.pipeline.lock().await;
        pipeline.engine.load_snapshot(snapshot);
        let window = pipeline.engine.event_window();
        pipeline.window = window;
        pipeline.known.prune(&window);
        for sink in &self.ports.sinks {
            sink.on_window(window);
        }
        info!(
            round = snapshot.round,
            ancient_threshold = window.ancient_threshold,
            "Consensus snapshot loaded"
        );
    }

    pub async fn status(&self) -> IntakeStatus {
        let pipeline = self.pipeline.lock().await;
        IntakeStatus {
            event_window: pipeline.window,
            election_round: pipeline.engine.election_round(),
            max_round: pipeline.engine.max_round(),
            liveness: pipeline.engine.liveness(),
            orphans: pipeline.orphans.len(),
            known_events: pipeline.known.len(),
            fallen_behind: self.fallen_behind.load(Ordering::SeqCst),
        }
    }

    /// Submissions currently waiting for or holding the pipeline.
    pub fn pending_submissions(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    async fn process(
        &self,
        gossip: GossipEvent,
        sender: Option<NodeId>,
        journal: bool,
    ) -> IntakeResult<IntakeOutcome> {
        if self.is_halted() {
            return Err(IntakeError::Halted);
        }
        let now = self.ports.time.now_nanos();
        let event = PlatformEvent::new(gossip).received(sender, now);

        if let Err(reason) = self.check_event(&event) {
            return Ok(self.reject(&event, reason));
        }

        let mut pipeline = self.pipeline.lock().await;
        if self.is_halted() {
            return Err(IntakeError::Halted);
        }

        let expired = pipeline.orphans.expire(now);
        if expired > 0 {
            debug!(expired, "Expired orphans dropped");
            metrics::record_orphans_discarded(expired);
        }

        if pipeline.window.is_ancient(event.birth_round()) {
            metrics::record_ancient();
            return Ok(IntakeOutcome::Ancient);
        }

        let hash = event.hash();
        if pipeline.known.contains(&hash) || pipeline.orphans.contains(&hash) {
            metrics::record_duplicate();
            return Ok(IntakeOutcome::Duplicate);
        }

        let missing = pipeline.known.missing_parents(event.unsigned(), &pipeline.window);
        if !missing.is_empty() {
            debug!(event = %event, missing = missing.len(), "Event buffered as orphan");
            let orphan = Orphan::new(event.gossip().clone(), sender, now, missing.iter().copied());
            let evicted = pipeline.orphans.insert(orphan);
            if !evicted.is_empty() {
                warn!(evicted = evicted.len(), "Orphan buffer full, oldest orphans evicted");
                metrics::record_orphans_discarded(evicted.len());
            }
            metrics::set_orphan_buffer_size(pipeline.orphans.len());
            return Ok(IntakeOutcome::Orphan { missing });
        }

        let first = match self.insert(&mut pipeline, event, journal).await? {
            Ok(inserted) => inserted,
            Err(rejected) => return Ok(rejected),
        };

        let mut consensus_rounds = first.rounds;
        let mut queue: VecDeque<PlatformEvent> = first.released.into();
        while let Some(next) = queue.pop_front() {
            if let Ok(inserted) = self.insert(&mut pipeline, next, true).await? {
                consensus_rounds.extend(inserted.rounds);
                queue.extend(inserted.released);
            }
        }
        metrics::set_orphan_buffer_size(pipeline.orphans.len());

        Ok(IntakeOutcome::Accepted { consensus_rounds })
    }

    /// Checks that need neither the lock nor the event's parents.
    fn check_event(&self, event: &PlatformEvent) -> Result<(), ValidationError> {
        validate_internal(event.unsigned(), &self.config)?;

        let creator = event.creator();
        let roster = self
            .rosters
            .roster_for_round(event.birth_round())
            .map_err(|_| ValidationError::UnknownCreator(creator))?;
        let public_key = roster
            .public_key(creator)
            .ok_or(ValidationError::UnknownCreator(creator))?;

        for parent in event.parents() {
            let member = self
                .rosters
                .roster_for_round(parent.birth_round)
                .map(|r| r.contains(parent.creator))
                .unwrap_or(false);
            if !member {
                return Err(ValidationError::UnknownParentCreator(parent.creator));
            }
        }

        if !self
            .ports
            .verifier
            .verify(public_key, &event.hash(), event.signature())
        {
            return Err(ValidationError::InvalidSignature);
        }
        Ok(())
    }

    /// Journal and insert an event whose parents are all known.
    async fn insert(
        &self,
        pipeline: &mut Pipeline<E>,
        event: PlatformEvent,
        journal: bool,
    ) -> IntakeResult<Result<Inserted, IntakeOutcome>> {
        if let Err(reason) = pipeline.known.check_links(event.unsigned()) {
            return Ok(Err(self.reject(&event, reason)));
        }

        if journal {
            if let Err(e) = self.ports.journal.append(event.gossip()).await {
                return Err(self.halt(e));
            }
        }

        let rounds = match pipeline.engine.add_event(event.clone()) {
            Ok(rounds) => rounds,
            Err(HashgraphError::DuplicateEvent(_)) => {
                metrics::record_duplicate();
                return Ok(Err(IntakeOutcome::Duplicate));
            }
            Err(HashgraphError::AncientEvent { .. }) => {
                metrics::record_ancient();
                return Ok(Err(IntakeOutcome::Ancient));
            }
            Err(e) => {
                return Ok(Err(self.reject(&event, ValidationError::Rejected(e.to_string()))));
            }
        };

        pipeline.known.insert(&event);
        for sink in &self.ports.sinks {
            sink.on_event_added(&event);
        }
        metrics::record_accepted();
        debug!(event = %event, "Event inserted");

        let mut released: Vec<PlatformEvent> = pipeline
            .orphans
            .release(&event.hash())
            .into_iter()
            .map(from_orphan)
            .collect();

        if !rounds.is_empty() {
            for round in &rounds {
                if let Err(e) = self.ports.observer.on_round(round.clone()).await {
                    return Err(self.halt(e));
                }
            }
            let window = pipeline.engine.event_window();
            released.extend(self.advance_window(pipeline, window).await);
        }

        Ok(Ok(Inserted { rounds, released }))
    }

    /// Propagate a new window. Returns orphans no longer waiting on anything.
    async fn advance_window(
        &self,
        pipeline: &mut Pipeline<E>,
        window: EventWindow,
    ) -> Vec<PlatformEvent> {
        if window == pipeline.window {
            return Vec::new();
        }
        pipeline.window = window;
        let forgotten = pipeline.known.prune(&window);

        if let Err(e) = self.ports.journal.advance_window(window).await {
            warn!(error = %e, "Journal pruning failed");
        }
        for sink in &self.ports.sinks {
            sink.on_window(window);
        }

        let outcome = pipeline.orphans.prune(&window, self.ports.time.now_nanos());
        if outcome.discarded > 0 {
            metrics::record_orphans_discarded(outcome.discarded);
        }
        debug!(
            latest_consensus_round = window.latest_consensus_round,
            ancient_threshold = window.ancient_threshold,
            forgotten,
            discarded_orphans = outcome.discarded,
            "Event window advanced"
        );
        outcome.ready.into_iter().map(from_orphan).collect()
    }

    fn reject(&self, event: &PlatformEvent, reason: ValidationError) -> IntakeOutcome {
        warn!(event = %event, sender = ?event.sender, %reason, "Invalid event rejected");
        metrics::record_invalid();
        if let Some(peer) = event.sender {
            self.ports.penalizer.penalize(peer, &reason);
        }
        IntakeOutcome::Invalid(reason)
    }

    fn halt(&self, cause: IntakeError) -> IntakeError {
        self.halted.store(true, Ordering::SeqCst);
        metrics::record_durability_failure();
        error!(error = %cause, "Durability failure, intake halted");
        match cause {
            IntakeError::DurabilityFailure(_) => cause,
            other => IntakeError::DurabilityFailure(other.to_string()),
        }
    }
}

fn from_orphan(orphan: Orphan) -> PlatformEvent {
    PlatformEvent::new(orphan.event).received(orphan.sender, orphan.received_at)
}

#[async_trait]
impl<E: ConsensusEngine + 'static> EventIntakeApi for EventIntakeService<E> {
    async fn submit(
        &self,
        event: GossipEvent,
        sender: Option<NodeId>,
    ) -> IntakeResult<IntakeOutcome> {
        let _pending = PendingGuard::enter(&self.pending);
        self.process(event, sender, true).await
    }

    async fn replay(&self, event: GossipEvent) -> IntakeResult<IntakeOutcome> {
        match self.process(event, None, false).await? {
            IntakeOutcome::Invalid(reason) => Err(IntakeError::InvalidEvent(reason)),
            outcome => Ok(outcome),
        }
    }

    async fn event_window(&self) -> EventWindow {
        self.pipeline.lock().await.window
    }

    fn is_halted(&self) -> bool {
        EventIntakeService::is_halted(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Ed25519SignatureVerifier;
    use hg_01_roster::{Roster, RosterEntry};
    use hg_03_hashgraph::{ConsensusConfig, Hashgraph};
    use parking_lot::Mutex as SyncMutex;
    use shared_crypto::{Ed25519KeyPair, EventSigner};
    use shared_types::{Hash, ManualTimeSource, UnsignedEvent, ROUND_FIRST};

    #[derive(Default)]
    struct MockJournal {
        appended: SyncMutex<Vec<Hash>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl EventJournal for MockJournal {
        async fn append(&self, event: &GossipEvent) -> IntakeResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(IntakeError::DurabilityFailure("disk full".into()));
            }
            self.appended.lock().push(event.event.hash());
            Ok(())
        }

        async fn advance_window(&self, _window: EventWindow) -> IntakeResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockObserver {
        rounds: SyncMutex<Vec<u64>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl ConsensusObserver for MockObserver {
        async fn on_round(&self, round: ConsensusRound) -> IntakeResult<()> {
            self.rounds.lock().push(round.round);
            if self.fail.load(Ordering::SeqCst) {
                return Err(IntakeError::DurabilityFailure("checkpoint failed".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPenalizer {
        penalized: SyncMutex<Vec<(NodeId, ValidationError)>>,
    }

    impl PeerPenalizer for MockPenalizer {
        fn penalize(&self, peer: NodeId, reason: &ValidationError) {
            self.penalized.lock().push((peer, reason.clone()));
        }
    }

    #[derive(Default)]
    struct MockSink {
        added: SyncMutex<Vec<Hash>>,
    }

    impl EventSink for MockSink {
        fn on_event_added(&self, event: &PlatformEvent) {
            self.added.lock().push(event.hash());
        }

        fn on_window(&self, _window: EventWindow) {}
    }

    struct Harness {
        intake: EventIntakeService<Hashgraph>,
        signers: Vec<EventSigner>,
        journal: Arc<MockJournal>,
        observer: Arc<MockObserver>,
        penalizer: Arc<MockPenalizer>,
        sink: Arc<MockSink>,
    }

    fn harness() -> Harness {
        let signers: Vec<EventSigner> = (0..4u64)
            .map(|i| EventSigner::new(NodeId(i), Ed25519KeyPair::from_seed([i as u8 + 1; 32])))
            .collect();
        let roster = Roster::new(
            signers
                .iter()
                .map(|s| RosterEntry::new(s.node_id(), s.public_key(), 10))
                .collect(),
        )
        .unwrap();
        let rosters = RosterHistory::new(roster);

        let journal = Arc::new(MockJournal::default());
        let observer = Arc::new(MockObserver::default());
        let penalizer = Arc::new(MockPenalizer::default());
        let sink = Arc::new(MockSink::default());
        let ports = IntakePorts {
            verifier: Arc::new(Ed25519SignatureVerifier),
            journal: journal.clone(),
            observer: observer.clone(),
            penalizer: penalizer.clone(),
            sinks: vec![sink.clone()],
            time: Arc::new(ManualTimeSource::new(1)),
        };
        let engine = Hashgraph::new(ConsensusConfig::default(), rosters.clone());
        Harness {
            intake: EventIntakeService::new(engine, rosters, IntakeConfig::default(), ports),
            signers,
            journal,
            observer,
            penalizer,
            sink,
        }
    }

    fn descriptor(event: &GossipEvent) -> shared_types::EventDescriptor {
        PlatformEvent::new(event.clone()).descriptor()
    }

    impl Harness {
        fn create(
            &self,
            creator: u64,
            self_parent: Option<&GossipEvent>,
            other_parent: Option<&GossipEvent>,
            time: u64,
        ) -> GossipEvent {
            let birth_round = self_parent
                .iter()
                .chain(other_parent.iter())
                .map(|p| p.event.birth_round)
                .max()
                .unwrap_or(ROUND_FIRST);
            self.signers[creator as usize].sign(UnsignedEvent {
                creator: NodeId(creator),
                self_parent: self_parent.map(descriptor),
                other_parent: other_parent.map(descriptor),
                time_created: time,
                birth_round,
                transactions: vec![format!("tx-{creator}-{time}").into_bytes()],
            })
        }
    }

    #[tokio::test]
    async fn test_accepted_event_is_journaled_and_published() {
        let h = harness();
        let e = h.create(0, None, None, 100);

        let outcome = h.intake.submit(e.clone(), Some(NodeId(1))).await.unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(*h.journal.appended.lock(), vec![e.event.hash()]);
        assert_eq!(*h.sink.added.lock(), vec![e.event.hash()]);
        assert_eq!(h.intake.status().await.known_events, 1);
    }

    #[tokio::test]
    async fn test_duplicate_is_a_noop() {
        let h = harness();
        let e = h.create(0, None, None, 100);

        h.intake.submit(e.clone(), None).await.unwrap();
        let outcome = h.intake.submit(e, Some(NodeId(2))).await.unwrap();

        assert_eq!(outcome, IntakeOutcome::Duplicate);
        assert_eq!(h.journal.appended.lock().len(), 1);
        assert!(h.penalizer.penalized.lock().is_empty());
    }

    #[tokio::test]
    async fn test_forged_signature_rejected_and_sender_penalized() {
        let h = harness();
        let mut forged = h.create(0, None, None, 100);
        forged.signature[3] ^= 0xff;

        let outcome = h.intake.submit(forged, Some(NodeId(2))).await.unwrap();

        assert_eq!(outcome, IntakeOutcome::Invalid(ValidationError::InvalidSignature));
        assert!(h.journal.appended.lock().is_empty());
        assert_eq!(
            *h.penalizer.penalized.lock(),
            vec![(NodeId(2), ValidationError::InvalidSignature)]
        );
        assert_eq!(h.intake.status().await.known_events, 0);
    }

    #[tokio::test]
    async fn test_unknown_creator_rejected() {
        let h = harness();
        let stranger = EventSigner::new(NodeId(9), Ed25519KeyPair::from_seed([9u8; 32]));
        let e = stranger.sign(UnsignedEvent {
            creator: NodeId(9),
            self_parent: None,
            other_parent: None,
            time_created: 1,
            birth_round: 1,
            transactions: vec![],
        });

        let outcome = h.intake.submit(e, Some(NodeId(1))).await.unwrap();
        assert_eq!(outcome, IntakeOutcome::Invalid(ValidationError::UnknownCreator(NodeId(9))));
    }

    #[tokio::test]
    async fn test_orphans_released_in_topological_order() {
        let h = harness();
        let a = h.create(0, None, None, 100);
        let b = h.create(1, None, Some(&a), 200);
        let c = h.create(0, Some(&a), Some(&b), 300);

        let outcome = h.intake.submit(c.clone(), Some(NodeId(1))).await.unwrap();
        assert!(matches!(outcome, IntakeOutcome::Orphan { .. }));
        let outcome = h.intake.submit(b.clone(), Some(NodeId(1))).await.unwrap();
        assert_eq!(
            outcome,
            IntakeOutcome::Orphan {
                missing: vec![a.event.hash()]
            }
        );
        assert_eq!(h.intake.status().await.orphans, 2);

        // resubmitting a buffered orphan is a duplicate
        assert_eq!(
            h.intake.submit(c.clone(), None).await.unwrap(),
            IntakeOutcome::Duplicate
        );

        assert!(h.intake.submit(a.clone(), None).await.unwrap().is_accepted());
        assert_eq!(
            *h.journal.appended.lock(),
            vec![a.event.hash(), b.event.hash(), c.event.hash()]
        );
        assert_eq!(h.intake.status().await.orphans, 0);
    }

    #[tokio::test]
    async fn test_self_parent_time_must_advance() {
        let h = harness();
        let a = h.create(0, None, None, 100);
        let b = h.create(0, Some(&a), None, 100);

        h.intake.submit(a, None).await.unwrap();
        let outcome = h.intake.submit(b, Some(NodeId(3))).await.unwrap();
        assert_eq!(
            outcome,
            IntakeOutcome::Invalid(ValidationError::TimeNotAfterSelfParent {
                time_created: 100,
                self_parent_time: 100
            })
        );
        assert_eq!(h.penalizer.penalized.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_journal_failure_halts_intake() {
        let h = harness();
        h.journal.fail.store(true, Ordering::SeqCst);
        let a = h.create(0, None, None, 100);

        let err = h.intake.submit(a.clone(), None).await.unwrap_err();
        assert!(matches!(err, IntakeError::DurabilityFailure(_)));
        assert!(h.intake.is_halted());
        assert!(h.sink.added.lock().is_empty());

        h.journal.fail.store(false, Ordering::SeqCst);
        assert_eq!(h.intake.submit(a, None).await.unwrap_err(), IntakeError::Halted);
    }

    #[tokio::test]
    async fn test_replay_does_not_rejournal() {
        let h = harness();
        let a = h.create(0, None, None, 100);

        assert!(h.intake.replay(a).await.unwrap().is_accepted());
        assert!(h.journal.appended.lock().is_empty());

        let mut forged = h.create(1, None, None, 100);
        forged.signature[0] ^= 1;
        assert_eq!(
            h.intake.replay(forged).await.unwrap_err(),
            IntakeError::InvalidEvent(ValidationError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_consensus_rounds_delivered_in_order() {
        let h = harness();
        let mut latest: Vec<GossipEvent> = Vec::new();
        let e1 = h.create(0, None, None, 1_000);
        latest.push(e1.clone());
        for creator in 1..4u64 {
            latest.push(h.create(creator, None, Some(&e1), 2_000));
        }

        let mut from_outcomes = Vec::new();
        for event in latest.clone() {
            let outcome = h.intake.submit(event, None).await.unwrap();
            from_outcomes.extend(outcome.consensus_rounds().iter().map(|r| r.round));
        }

        let mut time = 10_000;
        for _ in 0..30 {
            for creator in 0..4usize {
                time += 1_000;
                let other = (creator + 1) % 4;
                let event = h.create(
                    creator as u64,
                    Some(&latest[creator]),
                    Some(&latest[other]),
                    time,
                );
                latest[creator] = event.clone();
                let outcome = h.intake.submit(event, None).await.unwrap();
                assert!(outcome.is_accepted());
                from_outcomes.extend(outcome.consensus_rounds().iter().map(|r| r.round));
            }
        }

        let observed = h.observer.rounds.lock().clone();
        assert!(!observed.is_empty());
        assert_eq!(observed, from_outcomes);
        assert_eq!(observed[0], ROUND_FIRST);
        assert!(observed.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[tokio::test]
    async fn test_observer_failure_halts_intake() {
        let h = harness();
        h.observer.fail.store(true, Ordering::SeqCst);

        let mut latest: Vec<GossipEvent> =
            (0..4u64).map(|c| h.create(c, None, None, 100)).collect();
        for event in latest.clone() {
            assert!(h.intake.submit(event, None).await.unwrap().is_accepted());
        }
        let mut halted = None;
        let mut time = 1_000;
        'outer: for _ in 0..30 {
            for creator in 0..4usize {
                time += 1_000;
                let other = (creator + 1) % 4;
                let event =
                    h.create(creator as u64, latest.get(creator), latest.get(other), time);
                latest[creator] = event.clone();
                match h.intake.submit(event, None).await {
                    Ok(outcome) => assert!(outcome.is_accepted()),
                    Err(e) => {
                        halted = Some(e);
                        break 'outer;
                    }
                }
            }
        }

        assert!(matches!(halted, Some(IntakeError::DurabilityFailure(_))));
        assert!(h.intake.is_halted());
        assert_eq!(*h.observer.rounds.lock(), vec![ROUND_FIRST]);
        let next = h.create(0, latest.first(), None, time + 1_000);
        assert_eq!(h.intake.submit(next, None).await.unwrap_err(), IntakeError::Halted);
    }

    #[tokio::test]
    async fn test_status_reports_fallen_behind() {
        let h = harness();
        assert!(!h.intake.status().await.fallen_behind);
        h.intake.set_fallen_behind(true);
        assert!(h.intake.status().await.fallen_behind);
        h.intake.set_fallen_behind(false);
        assert!(!h.intake.status().await.fallen_behind);
    }
}

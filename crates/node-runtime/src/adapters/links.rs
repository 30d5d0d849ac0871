//! # Subsystem Links
//!
//! Adapters between subsystems that do not know each other:
//!
//! ```text
//! gossip ──IntakeSubmitter──→ intake ──ShadowgraphSink──→ shadowgraph
//! creator ─CreatorIntakeLink─→ intake ──CreatorSink─────→ creator tips
//!                              intake ──GossipPenalizer─→ peer reputation
//! ```
//!
//! Intake is built before gossip and the creator, so the links pointing back
//! from intake go through a `Deferred` filled in once the target exists.

use async_trait::async_trait;
use hg_02_event_intake::{
    EventIntakeApi, EventIntakeService, EventSink, IntakeOutcome, PeerPenalizer, ValidationError,
};
use hg_03_hashgraph::Hashgraph;
use hg_04_gossip::{EventSubmitter, GossipError, GossipResult, GossipService, Shadowgraph};
use hg_05_event_creator::{
    CreationPressure, CreatorError, CreatorIntake, CreatorResult, EventCreatorService,
};
use shared_types::{EventWindow, GossipEvent, NodeId, PlatformEvent};
use std::sync::{Arc, OnceLock};
use tracing::debug;

pub type NodeIntake = EventIntakeService<Hashgraph>;

/// A component set after its dependents were built.
pub struct Deferred<T>(OnceLock<Arc<T>>);

impl<T> Deferred<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(OnceLock::new()))
    }

    /// First call wins.
    pub fn set(&self, value: Arc<T>) {
        let _ = self.0.set(value);
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.0.get()
    }
}

pub struct ShadowgraphSink {
    shadowgraph: Arc<Shadowgraph>,
}

impl ShadowgraphSink {
    pub fn new(shadowgraph: Arc<Shadowgraph>) -> Self {
        Self { shadowgraph }
    }
}

impl EventSink for ShadowgraphSink {
    fn on_event_added(&self, event: &PlatformEvent) {
        self.shadowgraph.insert(event);
    }

    fn on_window(&self, window: EventWindow) {
        self.shadowgraph.set_window(window);
    }
}

pub struct CreatorSink {
    creator: Arc<Deferred<EventCreatorService>>,
}

impl CreatorSink {
    pub fn new(creator: Arc<Deferred<EventCreatorService>>) -> Self {
        Self { creator }
    }
}

impl EventSink for CreatorSink {
    fn on_event_added(&self, event: &PlatformEvent) {
        if let Some(creator) = self.creator.get() {
            creator.on_event_added(event);
        }
    }

    fn on_window(&self, window: EventWindow) {
        if let Some(creator) = self.creator.get() {
            creator.on_window(window);
        }
    }
}

pub struct GossipPenalizer {
    gossip: Arc<Deferred<GossipService>>,
}

impl GossipPenalizer {
    pub fn new(gossip: Arc<Deferred<GossipService>>) -> Self {
        Self { gossip }
    }
}

impl PeerPenalizer for GossipPenalizer {
    fn penalize(&self, peer: NodeId, reason: &ValidationError) {
        debug!(%peer, %reason, "Penalizing peer");
        if let Some(gossip) = self.gossip.get() {
            gossip.penalize(peer);
        }
    }
}

/// Gossip's way into intake.
pub struct IntakeSubmitter {
    intake: Arc<NodeIntake>,
}

impl IntakeSubmitter {
    pub fn new(intake: Arc<NodeIntake>) -> Self {
        Self { intake }
    }
}

#[async_trait]
impl EventSubmitter for IntakeSubmitter {
    async fn submit(&self, event: GossipEvent, sender: NodeId) -> GossipResult<bool> {
        self.intake
            .submit(event, Some(sender))
            .await
            .map(|outcome| outcome.is_accepted())
            .map_err(|e| GossipError::Intake(e.to_string()))
    }

    fn report_fallen_behind(&self, fallen_behind: bool) {
        self.intake.set_fallen_behind(fallen_behind);
    }
}

/// The creator's way into intake.
pub struct CreatorIntakeLink {
    intake: Arc<NodeIntake>,
}

impl CreatorIntakeLink {
    pub fn new(intake: Arc<NodeIntake>) -> Self {
        Self { intake }
    }
}

#[async_trait]
impl CreatorIntake for CreatorIntakeLink {
    async fn submit(&self, event: GossipEvent) -> CreatorResult<()> {
        match self.intake.submit(event, None).await {
            Ok(outcome) if outcome.is_accepted() => Ok(()),
            Ok(IntakeOutcome::Invalid(reason)) => Err(CreatorError::Submission(reason.to_string())),
            Ok(outcome) => Err(CreatorError::Submission(format!("{outcome:?}"))),
            Err(e) => Err(CreatorError::Submission(e.to_string())),
        }
    }

    async fn pressure(&self) -> CreationPressure {
        let status = self.intake.status().await;
        CreationPressure {
            intake_queue: self.intake.pending_submissions(),
            election_round: status.election_round,
            max_round: status.max_round,
        }
    }
}

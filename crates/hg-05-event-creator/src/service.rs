//! # Event Creator Service
//!
//! One creation attempt:
//!
//! 1. Ask intake for backpressure.
//! 2. Apply the creation rules against the tip tracker.
//! 3. Pick parents, drain a transaction batch, sign.
//! 4. Submit to intake. On failure the batch goes back to the pool.
//!
//! Attempts are serialized; two concurrent attempts would fork our own
//! chain.

use crate::domain::{
    birth_round, decide, time_created, CreationContext, CreationDecision, CreatorConfig,
    CreatorResult, SkipReason, TipTracker, TransactionPool,
};
use crate::metrics;
use crate::ports::inbound::EventCreatorApi;
use crate::ports::outbound::CreatorIntake;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::EventSigner;
use shared_types::{
    EventDescriptor, EventWindow, NodeId, PlatformEvent, TimeSource, UnsignedEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct EventCreatorService {
    config: CreatorConfig,
    signer: EventSigner,
    pool: Mutex<TransactionPool>,
    tips: Mutex<TipTracker>,
    intake: Arc<dyn CreatorIntake>,
    time: Arc<dyn TimeSource>,
    creating: tokio::sync::Mutex<()>,
}

impl EventCreatorService {
    pub fn new(
        config: CreatorConfig,
        signer: EventSigner,
        intake: Arc<dyn CreatorIntake>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let pool = TransactionPool::new(config.pool.clone());
        let tips = TipTracker::new(signer.node_id());
        Self {
            config,
            signer,
            pool: Mutex::new(pool),
            tips: Mutex::new(tips),
            intake,
            time,
            creating: tokio::sync::Mutex::new(()),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.signer.node_id()
    }

    /// Track an event intake inserted, ours or a peer's.
    pub fn on_event_added(&self, event: &PlatformEvent) {
        self.tips.lock().add(event);
    }

    pub fn on_window(&self, window: EventWindow) {
        self.tips.lock().set_window(window);
    }

    /// Our latest event, if any.
    pub fn self_tip(&self) -> Option<EventDescriptor> {
        self.tips.lock().self_tip().map(|t| t.descriptor)
    }

    async fn create(&self) -> CreatorResult<Option<EventDescriptor>> {
        let _creating = self.creating.lock().await;
        let pressure = self.intake.pressure().await;
        let now = self.time.now_nanos();

        let (unsigned, other_creator) = {
            let tips = self.tips.lock();
            let mut pool = self.pool.lock();
            let self_parent = tips.self_tip().cloned();
            let ctx = CreationContext {
                has_self_event: self_parent.is_some(),
                has_new_information: !tips.new_information().is_empty(),
                has_transactions: !pool.is_empty(),
                since_last_event: self_parent
                    .as_ref()
                    .map(|p| Duration::from_nanos(now.saturating_sub(p.time_created))),
                pressure,
            };
            if let CreationDecision::Skip(reason) = decide(&self.config, &ctx) {
                metrics::record_skipped(skip_label(reason));
                if !matches!(reason, SkipReason::Idle | SkipReason::NoNewInformation) {
                    debug!(node = %self.node_id(), ?reason, "Event creation held back");
                }
                return Ok(None);
            }

            let other_parent = tips.choose_other_parent();
            let self_descriptor = self_parent.as_ref().map(|p| p.descriptor);
            let window = tips.window();
            let transactions = pool.take_batch(
                self.config.max_transactions_per_event,
                self.config.max_transaction_bytes_per_event,
            );
            metrics::set_pool_size(pool.len());
            let unsigned = UnsignedEvent {
                creator: self.node_id(),
                self_parent: self_descriptor,
                other_parent,
                time_created: time_created(now, self_parent.as_ref()),
                birth_round: birth_round(&window, self_descriptor.as_ref(), other_parent.as_ref()),
                transactions,
            };
            (unsigned, other_parent.map(|p| p.creator))
        };

        let transactions = unsigned.transactions.clone();
        let event = PlatformEvent::new(self.signer.sign(unsigned));
        let descriptor = event.descriptor();

        if let Err(e) = self.intake.submit(event.gossip().clone()).await {
            warn!(node = %self.node_id(), error = %e, "Self-event rejected");
            self.pool.lock().restore(transactions);
            return Err(e);
        }

        {
            let mut tips = self.tips.lock();
            tips.add(&event);
            if let Some(creator) = other_creator {
                tips.mark_used(creator);
            }
        }
        metrics::record_event_created(transactions.len());
        debug!(
            node = %self.node_id(),
            event = %event,
            transactions = transactions.len(),
            "Created event"
        );
        Ok(Some(descriptor))
    }

    /// Run creation attempts every `creation_interval` until shutdown or a
    /// rejected self-event.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.creation_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(node = %self.node_id(), "Event creator started");
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = self.create().await {
                            warn!(node = %self.node_id(), error = %e, "Event creator stopping");
                            break;
                        }
                    }
                }
            }
            info!(node = %self.node_id(), "Event creator stopped");
        })
    }
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::IntakeBacklog(_) => "intake_backlog",
        SkipReason::UndecidedRounds(_) => "undecided_rounds",
        SkipReason::NoNewInformation => "no_new_information",
        SkipReason::Idle => "idle",
    }
}

#[async_trait]
impl EventCreatorApi for EventCreatorService {
    fn submit_transaction(&self, transaction: Vec<u8>) -> CreatorResult<()> {
        let mut pool = self.pool.lock();
        pool.submit(transaction)?;
        metrics::set_pool_size(pool.len());
        Ok(())
    }

    async fn maybe_create(&self) -> CreatorResult<Option<EventDescriptor>> {
        self.create().await
    }

    fn pending_transactions(&self) -> usize {
        self.pool.lock().len()
    }
}

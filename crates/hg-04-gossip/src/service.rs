//! # Gossip Service
//!
//! Runs sync sessions against randomly chosen peers and answers theirs.
//!
//! One session:
//!
//! ```text
//! initiator                          responder
//!     │ ── SyncRequest(summary) ──────→ │
//!     │ ←── SyncResponse(summary, events it has we lack)
//!     │  submit events to intake        │
//!     │ ── push(events we have it lacks) →
//! ```
//!
//! Sessions run as independent tasks bounded by a semaphore. Only the
//! network calls are subject to the sync timeout; a submission to intake is
//! never cancelled halfway.
//!
//! Both sides compare event windows first. When one side needs events the
//! other already considers ancient, no events are exchanged and the side
//! that is behind records the peer in its fallen-behind monitor.

use crate::domain::{
    FallenBehindMonitor, FreshnessFilter, GossipConfig, GossipError, GossipResult, PeerState,
    PeerTable, Shadowgraph, SyncReport, SyncRequest, SyncResponse, SyncStatus,
};
use crate::metrics;
use crate::ports::inbound::GossipApi;
use crate::ports::outbound::{EventSubmitter, PeerTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{EventWindow, GossipEvent, NodeId, TimeSource};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct GossipService {
    self_id: NodeId,
    config: GossipConfig,
    shadowgraph: Arc<Shadowgraph>,
    peers: Mutex<PeerTable>,
    fallen_behind: Mutex<FallenBehindMonitor>,
    transport: Arc<dyn PeerTransport>,
    submitter: Arc<dyn EventSubmitter>,
    time: Arc<dyn TimeSource>,
    sessions: Arc<Semaphore>,
    stopped: AtomicBool,
}

impl GossipService {
    pub fn new(
        self_id: NodeId,
        config: GossipConfig,
        peers: impl IntoIterator<Item = NodeId>,
        shadowgraph: Arc<Shadowgraph>,
        transport: Arc<dyn PeerTransport>,
        submitter: Arc<dyn EventSubmitter>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let peers: Vec<NodeId> = peers.into_iter().filter(|p| *p != self_id).collect();
        let fallen_behind = FallenBehindMonitor::new(peers.len(), config.fallen_behind_threshold);
        let table = PeerTable::new(config.reputation.clone(), peers);
        let sessions = Arc::new(Semaphore::new(config.max_concurrent_syncs.max(1)));
        Self {
            self_id,
            config,
            shadowgraph,
            peers: Mutex::new(table),
            fallen_behind: Mutex::new(fallen_behind),
            transport,
            submitter,
            time,
            sessions,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn self_id(&self) -> NodeId {
        self.self_id
    }

    pub fn shadowgraph(&self) -> &Arc<Shadowgraph> {
        &self.shadowgraph
    }

    pub fn peer_state(&self, peer: NodeId) -> Option<PeerState> {
        self.peers.lock().get(peer).cloned()
    }

    /// True while too many peers consider events we still need ancient.
    pub fn has_fallen_behind(&self) -> bool {
        self.fallen_behind.lock().has_fallen_behind()
    }

    /// Compare windows with `peer` and update the fallen-behind verdict.
    fn observe_window(
        &self,
        peer: NodeId,
        ours: &EventWindow,
        theirs: &EventWindow,
    ) -> SyncStatus {
        let status = SyncStatus::check(ours, theirs);
        let (changed, fallen_behind, reported) = {
            let mut monitor = self.fallen_behind.lock();
            let changed = monitor.record(peer, status);
            (changed, monitor.has_fallen_behind(), monitor.reported())
        };
        if changed {
            if fallen_behind {
                warn!(
                    node = %self.self_id,
                    reported,
                    latest_consensus_round = ours.latest_consensus_round,
                    "Node has fallen behind its peers"
                );
            } else {
                info!(node = %self.self_id, "Node caught up with its peers");
            }
            metrics::set_fallen_behind(fallen_behind);
            self.submitter.report_fallen_behind(fallen_behind);
        }
        status
    }

    /// Lower the reputation of a peer that sent an invalid event.
    pub fn penalize(&self, peer: NodeId) {
        let mut peers = self.peers.lock();
        peers.penalize(peer);
        if peers.is_banned(peer) {
            warn!(node = %self.self_id, %peer, "Peer banned from gossip");
        }
    }

    fn freshness_filter(&self) -> Option<FreshnessFilter> {
        self.config.filter_likely_duplicates.then(|| FreshnessFilter {
            self_id: self.self_id,
            now: self.time.now_nanos(),
            threshold_nanos: self.config.non_ancestor_filter_threshold.as_nanos() as u64,
        })
    }

    async fn with_timeout<T>(
        &self,
        peer: NodeId,
        call: impl Future<Output = GossipResult<T>>,
    ) -> GossipResult<T> {
        tokio::time::timeout(self.config.sync_timeout, call)
            .await
            .map_err(|_| GossipError::Timeout(peer))?
    }

    /// Run one sync session with a selected peer.
    pub async fn sync_once(&self) -> GossipResult<SyncReport> {
        let _permit = Arc::clone(&self.sessions)
            .acquire_owned()
            .await
            .map_err(|_| GossipError::Shutdown)?;

        let our_round = self.shadowgraph.window().latest_consensus_round;
        let peer = {
            let mut rng = rand::thread_rng();
            self.peers.lock().select(&mut rng, our_round, Instant::now())
        }
        .ok_or(GossipError::NoPeers)?;

        match self.exchange(peer).await {
            Ok((report, peer_round)) => {
                self.peers.lock().record_success(peer, peer_round);
                metrics::record_sync_completed(report.received, report.pushed);
                debug!(
                    node = %self.self_id,
                    %peer,
                    received = report.received,
                    accepted = report.accepted,
                    pushed = report.pushed,
                    "Sync completed"
                );
                Ok(report)
            }
            Err(GossipError::Intake(reason)) => {
                self.peers.lock().release(peer);
                self.stopped.store(true, Ordering::SeqCst);
                Err(GossipError::Intake(reason))
            }
            Err(e) => {
                let backoff = self.peers.lock().record_failure(peer, Instant::now());
                metrics::record_sync_failure();
                debug!(
                    node = %self.self_id,
                    %peer,
                    error = %e,
                    backoff_ms = backoff.as_millis() as u64,
                    "Sync failed"
                );
                Err(match e {
                    GossipError::Timeout(_) => e,
                    other => GossipError::PeerSyncFailure {
                        peer,
                        reason: other.to_string(),
                    },
                })
            }
        }
    }

    async fn exchange(&self, peer: NodeId) -> GossipResult<(SyncReport, u64)> {
        let summary = self.shadowgraph.summary();
        let our_window = summary.event_window;
        let request = SyncRequest {
            from: self.self_id,
            summary,
        };
        let response = self
            .with_timeout(peer, self.transport.sync(peer, request))
            .await?;
        let peer_round = response.summary.latest_round();

        let status = self.observe_window(peer, &our_window, &response.summary.event_window);
        if status != SyncStatus::InSync {
            debug!(node = %self.self_id, %peer, ?status, "Event windows too far apart to sync");
            let report = SyncReport {
                peer,
                received: 0,
                accepted: 0,
                pushed: 0,
            };
            return Ok((report, peer_round));
        }

        let received = response.events.len();
        let mut accepted = 0;
        for event in response.events {
            if self.submitter.submit(event, peer).await? {
                accepted += 1;
            }
        }

        let outgoing = self
            .shadowgraph
            .events_unknown_to(&response.summary, self.freshness_filter());
        let pushed = outgoing.len();
        if !outgoing.is_empty() {
            self.with_timeout(peer, self.transport.push(peer, self.self_id, outgoing))
                .await?;
        }

        let report = SyncReport {
            peer,
            received,
            accepted,
            pushed,
        };
        Ok((report, peer_round))
    }

    /// Start the gossip loop. Each tick starts a session if a slot is free.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.sync_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(node = %self.self_id, "Gossip started");
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        if self.stopped.load(Ordering::SeqCst) {
                            warn!(node = %self.self_id, "Intake unavailable, gossip stopping");
                            break;
                        }
                        if self.sessions.available_permits() == 0 {
                            continue;
                        }
                        let service = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = service.sync_once().await {
                                if matches!(e, GossipError::Intake(_)) {
                                    warn!(node = %service.self_id, error = %e, "Sync aborted");
                                }
                            }
                        });
                    }
                }
            }
            info!(node = %self.self_id, "Gossip stopped");
        })
    }
}

#[async_trait]
impl GossipApi for GossipService {
    async fn handle_sync(&self, request: SyncRequest) -> GossipResult<SyncResponse> {
        if self.peers.lock().is_banned(request.from) {
            return Err(GossipError::PeerSyncFailure {
                peer: request.from,
                reason: "peer is banned".into(),
            });
        }
        let summary = self.shadowgraph.summary();
        let status = self.observe_window(
            request.from,
            &summary.event_window,
            &request.summary.event_window,
        );
        if status != SyncStatus::InSync {
            return Ok(SyncResponse {
                summary,
                events: Vec::new(),
            });
        }
        let events = self
            .shadowgraph
            .events_unknown_to(&request.summary, self.freshness_filter());
        metrics::record_events_sent(events.len());
        Ok(SyncResponse { summary, events })
    }

    async fn handle_push(&self, from: NodeId, events: Vec<GossipEvent>) -> GossipResult<usize> {
        let mut accepted = 0;
        for event in events {
            if self.submitter.submit(event, from).await? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }
}

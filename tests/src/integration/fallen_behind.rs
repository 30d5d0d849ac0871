//! # Fallen Behind
//!
//! Gossip compares event windows before exchanging events. A node whose
//! pending round is ancient for most of its peers cannot be sent the events
//! it needs; intake status reports it until the peers are back in range.

#[cfg(test)]
mod tests {
    use crate::fixtures::{DagBuilder, Pipeline};
    use async_trait::async_trait;
    use hg_04_gossip::{
        GossipConfig, GossipResult, GossipService, PeerTransport, Shadowgraph, SyncRequest,
        SyncResponse, SyncSummary,
    };
    use node_runtime::adapters::IntakeSubmitter;
    use parking_lot::Mutex;
    use shared_types::{EventWindow, GossipEvent, ManualTimeSource, NodeId};
    use std::sync::Arc;

    /// Every peer answers with the same window and no events.
    struct PeersAt(Mutex<EventWindow>);

    #[async_trait]
    impl PeerTransport for PeersAt {
        async fn sync(&self, _peer: NodeId, _request: SyncRequest) -> GossipResult<SyncResponse> {
            Ok(SyncResponse {
                summary: SyncSummary {
                    tips: vec![],
                    event_window: *self.0.lock(),
                },
                events: vec![],
            })
        }

        async fn push(
            &self,
            _peer: NodeId,
            _from: NodeId,
            _events: Vec<GossipEvent>,
        ) -> GossipResult<()> {
            Ok(())
        }
    }

    async fn sync_until(gossip: &GossipService, fallen_behind: bool) {
        for _ in 0..200 {
            gossip.sync_once().await.unwrap();
            if gossip.has_fallen_behind() == fallen_behind {
                return;
            }
        }
        panic!("fallen-behind verdict never became {fallen_behind}");
    }

    #[tokio::test]
    async fn test_intake_status_tracks_fallen_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dag = DagBuilder::new(4, 5);
        let pipeline = Pipeline::open(dir.path(), dag.rosters(), 10);
        let peers = Arc::new(PeersAt(Mutex::new(EventWindow::new(60, 26))));
        let gossip = GossipService::new(
            NodeId(0),
            GossipConfig::default(),
            (0..4).map(NodeId),
            Arc::new(Shadowgraph::new()),
            peers.clone(),
            Arc::new(IntakeSubmitter::new(pipeline.intake.clone())),
            Arc::new(ManualTimeSource::new(0)),
        );

        // a single report out of three peers is not enough
        gossip.sync_once().await.unwrap();
        assert!(!gossip.has_fallen_behind());
        assert!(!pipeline.intake.status().await.fallen_behind);

        sync_until(&gossip, true).await;
        assert!(pipeline.intake.status().await.fallen_behind);

        *peers.0.lock() = EventWindow::new(20, 26);
        sync_until(&gossip, false).await;
        assert!(!pipeline.intake.status().await.fallen_behind);
    }
}

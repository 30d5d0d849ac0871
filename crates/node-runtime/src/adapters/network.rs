//! # Local Network Transport
//!
//! In-process `PeerTransport`: every node registers its `GossipApi` and
//! calls reach the peer's handler directly. Nodes can be isolated to
//! simulate partitions and crashes.

use async_trait::async_trait;
use hg_04_gossip::{GossipApi, GossipError, GossipResult, PeerTransport, SyncRequest, SyncResponse};
use parking_lot::RwLock;
use shared_types::{GossipEvent, NodeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
pub struct LocalNetwork {
    nodes: RwLock<HashMap<NodeId, Arc<dyn GossipApi>>>,
    isolated: RwLock<HashSet<NodeId>>,
}

impl LocalNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, node: NodeId, api: Arc<dyn GossipApi>) {
        self.nodes.write().insert(node, api);
    }

    pub fn unregister(&self, node: NodeId) {
        self.nodes.write().remove(&node);
    }

    /// Cut `node` off from every peer until `reconnect`.
    pub fn isolate(&self, node: NodeId) {
        self.isolated.write().insert(node);
    }

    pub fn reconnect(&self, node: NodeId) {
        self.isolated.write().remove(&node);
    }

    fn route(&self, from: NodeId, to: NodeId) -> GossipResult<Arc<dyn GossipApi>> {
        {
            let isolated = self.isolated.read();
            if isolated.contains(&from) || isolated.contains(&to) {
                return Err(GossipError::Transport(format!("{from} cannot reach {to}")));
            }
        }
        self.nodes
            .read()
            .get(&to)
            .cloned()
            .ok_or_else(|| GossipError::Transport(format!("{to} is not running")))
    }
}

#[async_trait]
impl PeerTransport for LocalNetwork {
    async fn sync(&self, peer: NodeId, request: SyncRequest) -> GossipResult<SyncResponse> {
        let api = self.route(request.from, peer)?;
        api.handle_sync(request).await
    }

    async fn push(&self, peer: NodeId, from: NodeId, events: Vec<GossipEvent>) -> GossipResult<()> {
        let api = self.route(from, peer)?;
        api.handle_push(from, events).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hg_04_gossip::SyncSummary;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        pushes: Mutex<Vec<(NodeId, usize)>>,
    }

    #[async_trait]
    impl GossipApi for Recorder {
        async fn handle_sync(&self, request: SyncRequest) -> GossipResult<SyncResponse> {
            Ok(SyncResponse {
                summary: request.summary,
                events: vec![],
            })
        }

        async fn handle_push(&self, from: NodeId, events: Vec<GossipEvent>) -> GossipResult<usize> {
            self.pushes.lock().push((from, events.len()));
            Ok(events.len())
        }
    }

    fn request(from: u64) -> SyncRequest {
        SyncRequest {
            from: NodeId(from),
            summary: SyncSummary::default(),
        }
    }

    #[tokio::test]
    async fn test_routes_to_registered_node() {
        let network = LocalNetwork::new();
        let recorder = Arc::new(Recorder::default());
        network.register(NodeId(1), recorder.clone());

        network.sync(NodeId(1), request(0)).await.unwrap();
        network.push(NodeId(1), NodeId(0), vec![]).await.unwrap();
        assert_eq!(*recorder.pushes.lock(), vec![(NodeId(0), 0)]);

        assert!(matches!(
            network.sync(NodeId(2), request(0)).await,
            Err(GossipError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_isolation_blocks_both_directions() {
        let network = LocalNetwork::new();
        network.register(NodeId(0), Arc::new(Recorder::default()));
        network.register(NodeId(1), Arc::new(Recorder::default()));

        network.isolate(NodeId(0));
        assert!(network.sync(NodeId(1), request(0)).await.is_err());
        assert!(network.sync(NodeId(0), request(1)).await.is_err());

        network.reconnect(NodeId(0));
        assert!(network.sync(NodeId(1), request(0)).await.is_ok());
    }
}

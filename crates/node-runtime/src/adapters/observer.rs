//! # Round Observer Adapter
//!
//! Receives decided rounds from intake, applies them to the platform state
//! and forwards newly applied rounds to the application channel. Rounds at
//! or below the state round (re-decided while replaying) are dropped.
//!
//! A round whose checkpoint failed is still forwarded, then reported as a
//! durability failure so intake halts. Any other apply error halts intake
//! without forwarding.
//!
//! The channel is bounded; a slow application blocks intake here.

use super::journal::PruneFloor;
use async_trait::async_trait;
use hg_02_event_intake::{ConsensusObserver, IntakeError, IntakeResult};
use hg_07_platform_state::{FileStateStore, PlatformStateService, StateError};
use shared_types::{ConsensusRound, NodeId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

pub type NodeStateService = PlatformStateService<FileStateStore>;

pub struct RoundObserver {
    node: NodeId,
    state: Arc<NodeStateService>,
    output: mpsc::Sender<ConsensusRound>,
    floor: PruneFloor,
    checkpoint_interval: u64,
}

impl RoundObserver {
    pub fn new(
        node: NodeId,
        state: Arc<NodeStateService>,
        output: mpsc::Sender<ConsensusRound>,
        floor: PruneFloor,
        checkpoint_interval: u64,
    ) -> Self {
        Self {
            node,
            state,
            output,
            floor,
            checkpoint_interval,
        }
    }
}

#[async_trait]
impl ConsensusObserver for RoundObserver {
    async fn on_round(&self, round: ConsensusRound) -> IntakeResult<()> {
        let checkpoint_failure = match self.state.apply(&round) {
            Ok(true) => None,
            Ok(false) => return Ok(()),
            Err(e @ StateError::CheckpointFailed { .. }) => Some(e),
            Err(e) => {
                error!(node = %self.node, round = round.round, error = %e, "Failed to apply round");
                return Err(IntakeError::DurabilityFailure(e.to_string()));
            }
        };

        let current = self.state.current();
        let checkpointed = checkpoint_failure.is_none()
            && self.checkpoint_interval > 0
            && current.round % self.checkpoint_interval == 0;
        if checkpointed {
            self.floor.raise(current.event_window.ancient_threshold);
        }
        hg_telemetry::record_round_delivered(
            &self.node.to_string(),
            round.round,
            round.transaction_count(),
        );

        let number = round.round;
        if self.output.send(round).await.is_err() {
            debug!(node = %self.node, "Round receiver dropped");
        }

        match checkpoint_failure {
            Some(e) => {
                error!(node = %self.node, round = number, error = %e, "Checkpoint failed");
                Err(IntakeError::DurabilityFailure(e.to_string()))
            }
            None => Ok(()),
        }
    }
}

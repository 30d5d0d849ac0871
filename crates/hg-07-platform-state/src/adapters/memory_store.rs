use crate::domain::{PlatformState, StateResult};
use crate::ports::outbound::StateStore;
use parking_lot::RwLock;

/// In-memory store for tests and ephemeral nodes.
#[derive(Default)]
pub struct InMemoryStateStore {
    checkpoints: RwLock<Vec<PlatformState>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.checkpoints.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.read().is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn save(&self, state: &PlatformState) -> StateResult<()> {
        self.checkpoints.write().push(state.clone());
        Ok(())
    }

    fn load_latest(&self) -> StateResult<Option<PlatformState>> {
        Ok(self.checkpoints.read().iter().max_by_key(|s| s.round).cloned())
    }
}

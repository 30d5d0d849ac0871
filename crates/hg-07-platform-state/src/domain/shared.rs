//! Latest state handle shared between the consensus path and readers

use super::PlatformState;
use parking_lot::RwLock;
use std::sync::Arc;

/// Readers clone the current `Arc`; the writer swaps in new versions.
#[derive(Clone, Debug)]
pub struct SharedPlatformState {
    inner: Arc<RwLock<Arc<PlatformState>>>,
}

impl SharedPlatformState {
    pub fn new(state: PlatformState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    pub fn load(&self) -> Arc<PlatformState> {
        Arc::clone(&self.inner.read())
    }

    pub fn store(&self, state: Arc<PlatformState>) {
        *self.inner.write() = state;
    }
}

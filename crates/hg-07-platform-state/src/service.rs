//! # Platform State Service
//!
//! Applies consensus rounds to the platform state in order, publishes each
//! new version through `SharedPlatformState`, and checkpoints every
//! `checkpoint_interval` rounds.

use crate::domain::{PlatformState, SharedPlatformState, StateConfig, StateError, StateResult};
use crate::ports::outbound::StateStore;
use shared_types::{short_hash, ConsensusRound, Hash};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PlatformStateService<S: StateStore> {
    store: S,
    config: StateConfig,
    shared: SharedPlatformState,
}

impl<S: StateStore> PlatformStateService<S> {
    /// Start from the latest checkpoint in `store`, or from genesis.
    pub fn open(store: S, config: StateConfig, roster_hash: Hash) -> StateResult<Self> {
        let initial = match store.load_latest()? {
            Some(state) => {
                info!(
                    round = state.round,
                    version = state.version,
                    running_hash = %short_hash(&state.running_hash),
                    "Loaded platform state checkpoint"
                );
                state
            }
            None => PlatformState::genesis(roster_hash),
        };
        Ok(Self {
            store,
            config,
            shared: SharedPlatformState::new(initial),
        })
    }

    /// Handle for readers.
    pub fn shared(&self) -> SharedPlatformState {
        self.shared.clone()
    }

    pub fn current(&self) -> Arc<PlatformState> {
        self.shared.load()
    }

    /// Apply a decided round. Rounds at or below the current one are
    /// skipped, which happens while replaying events past a checkpoint.
    ///
    /// The new version is published before its checkpoint is written. A
    /// failed checkpoint returns `CheckpointFailed` with the round applied.
    pub fn apply(&self, round: &ConsensusRound) -> StateResult<bool> {
        let current = self.shared.load();
        if round.round <= current.round {
            debug!(round = round.round, current = current.round, "Round already applied");
            return Ok(false);
        }

        let next = Arc::new(current.apply_round(round)?);
        self.shared.store(Arc::clone(&next));

        let interval = self.config.checkpoint_interval;
        if interval > 0 && next.round % interval == 0 {
            self.store
                .save(&next)
                .map_err(|e| StateError::CheckpointFailed {
                    round: next.round,
                    message: e.to_string(),
                })?;
            info!(round = next.round, version = next.version, "Checkpoint written");
        }
        Ok(true)
    }

    /// Force a checkpoint of the current state.
    pub fn checkpoint(&self) -> StateResult<()> {
        self.store.save(&self.shared.load())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FileStateStore, InMemoryStateStore};
    use shared_types::{ConsensusSnapshot, EventWindow};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Fails saves while `fail` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStateStore,
        fail: AtomicBool,
    }

    impl StateStore for FlakyStore {
        fn save(&self, state: &PlatformState) -> StateResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StateError::Io {
                    message: "disk full".into(),
                });
            }
            self.inner.save(state)
        }

        fn load_latest(&self) -> StateResult<Option<PlatformState>> {
            self.inner.load_latest()
        }
    }

    fn empty_round(number: u64) -> ConsensusRound {
        ConsensusRound {
            round: number,
            judges: vec![],
            events: vec![],
            consensus_timestamp: number * 1000,
            snapshot: ConsensusSnapshot {
                round: number,
                ..ConsensusSnapshot::default()
            },
            event_window: EventWindow::new(number, 26),
        }
    }

    fn config(interval: u64) -> StateConfig {
        StateConfig {
            checkpoint_interval: interval,
            ..StateConfig::default()
        }
    }

    #[test]
    fn test_checkpoint_every_interval() {
        let service =
            PlatformStateService::open(InMemoryStateStore::new(), config(2), [0u8; 32]).unwrap();
        for round in 1..=5 {
            assert!(service.apply(&empty_round(round)).unwrap());
        }

        assert_eq!(service.current().round, 5);
        assert_eq!(service.current().version, 5);
        assert_eq!(service.store.len(), 2);
        assert_eq!(service.store.load_latest().unwrap().unwrap().round, 4);
    }

    #[test]
    fn test_replayed_rounds_skipped() {
        let service =
            PlatformStateService::open(InMemoryStateStore::new(), config(10), [0u8; 32]).unwrap();
        service.apply(&empty_round(1)).unwrap();
        service.apply(&empty_round(2)).unwrap();

        assert!(!service.apply(&empty_round(2)).unwrap());
        assert!(!service.apply(&empty_round(1)).unwrap());
        assert_eq!(service.current().version, 2);
    }

    #[test]
    fn test_reopen_resumes_from_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStateStore::new(dir.path(), 3).unwrap();
            let service = PlatformStateService::open(store, config(3), [7u8; 32]).unwrap();
            for round in 1..=4 {
                service.apply(&empty_round(round)).unwrap();
            }
        }

        let store = FileStateStore::new(dir.path(), 3).unwrap();
        let service = PlatformStateService::open(store, config(3), [7u8; 32]).unwrap();
        assert_eq!(service.current().round, 3);
        assert_eq!(service.current().snapshot.round, 3);
        assert!(service.apply(&empty_round(4)).unwrap());
        assert_eq!(service.current().version, 4);
    }

    #[test]
    fn test_readers_see_new_versions() {
        let service =
            PlatformStateService::open(InMemoryStateStore::new(), config(0), [0u8; 32]).unwrap();
        let reader = service.shared();
        service.apply(&empty_round(1)).unwrap();
        assert_eq!(reader.load().round, 1);
        assert!(service.store.is_empty());
    }

    #[test]
    fn test_failed_checkpoint_keeps_round() {
        let service =
            PlatformStateService::open(FlakyStore::default(), config(2), [0u8; 32]).unwrap();
        assert!(service.apply(&empty_round(1)).unwrap());

        service.store.fail.store(true, Ordering::SeqCst);
        assert_eq!(
            service.apply(&empty_round(2)).unwrap_err(),
            StateError::CheckpointFailed {
                round: 2,
                message: "State I/O error: disk full".into()
            }
        );
        assert_eq!(service.current().round, 2);
        assert_eq!(service.current().version, 2);
        assert!(!service.apply(&empty_round(2)).unwrap());

        service.store.fail.store(false, Ordering::SeqCst);
        assert!(service.apply(&empty_round(3)).unwrap());
        assert_eq!(service.current().version, 3);
        assert!(service.store.inner.is_empty());
    }

    #[test]
    fn test_round_gap_rejected() {
        let service =
            PlatformStateService::open(InMemoryStateStore::new(), config(0), [0u8; 32]).unwrap();
        service.apply(&empty_round(1)).unwrap();
        assert_eq!(
            service.apply(&empty_round(3)).unwrap_err(),
            StateError::RoundGap {
                round: 3,
                current: 1
            }
        );
        assert_eq!(service.current().round, 1);
    }
}

//! Peer table
//!
//! Reputation, in-flight state and backoff of every gossip peer. Selection is
//! random, weighted by reputation and discounted by how many rounds the peer
//! lags behind us.

use super::ReputationConfig;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use shared_types::NodeId;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PeerState {
    pub reputation: f64,
    pub in_flight: bool,
    /// Consecutive failures since the last success.
    pub failures: u32,
    pub backoff_until: Option<Instant>,
    /// Latest consensus round the peer reported.
    pub latest_round: u64,
    pub syncs: u64,
}

impl PeerState {
    fn new(reputation: f64) -> Self {
        Self {
            reputation,
            in_flight: false,
            failures: 0,
            backoff_until: None,
            latest_round: 0,
            syncs: 0,
        }
    }
}

#[derive(Debug)]
pub struct PeerTable {
    config: ReputationConfig,
    peers: BTreeMap<NodeId, PeerState>,
}

impl PeerTable {
    pub fn new(config: ReputationConfig, peers: impl IntoIterator<Item = NodeId>) -> Self {
        let initial = config.initial;
        Self {
            peers: peers
                .into_iter()
                .map(|p| (p, PeerState::new(initial)))
                .collect(),
            config,
        }
    }

    pub fn get(&self, peer: NodeId) -> Option<&PeerState> {
        self.peers.get(&peer)
    }

    pub fn is_banned(&self, peer: NodeId) -> bool {
        self.peers
            .get(&peer)
            .is_some_and(|p| p.reputation <= self.config.ban_threshold)
    }

    /// Pick a peer for the next sync and mark it in flight.
    pub fn select<R: Rng>(&mut self, rng: &mut R, our_round: u64, now: Instant) -> Option<NodeId> {
        let candidates: Vec<(NodeId, f64)> = self
            .peers
            .iter()
            .filter(|(_, p)| !p.in_flight && p.reputation > self.config.ban_threshold)
            .filter(|(_, p)| p.backoff_until.map_or(true, |until| until <= now))
            .map(|(id, p)| {
                let lag = our_round.saturating_sub(p.latest_round) as f64;
                (*id, p.reputation / (1.0 + lag))
            })
            .collect();

        let weights = WeightedIndex::new(candidates.iter().map(|(_, w)| *w)).ok()?;
        let (peer, _) = candidates[weights.sample(rng)];
        if let Some(state) = self.peers.get_mut(&peer) {
            state.in_flight = true;
        }
        Some(peer)
    }

    pub fn record_success(&mut self, peer: NodeId, latest_round: u64) {
        if let Some(state) = self.peers.get_mut(&peer) {
            state.in_flight = false;
            state.failures = 0;
            state.backoff_until = None;
            state.latest_round = latest_round;
            state.syncs += 1;
            state.reputation = (state.reputation + self.config.success_reward).min(self.config.max);
        }
    }

    /// Penalise a failed sync and back the peer off exponentially.
    pub fn record_failure(&mut self, peer: NodeId, now: Instant) -> Duration {
        let Some(state) = self.peers.get_mut(&peer) else {
            return Duration::ZERO;
        };
        state.in_flight = false;
        state.failures = state.failures.saturating_add(1);
        state.reputation = (state.reputation - self.config.failure_penalty).max(0.0);

        let exponent = state.failures.saturating_sub(1).min(16);
        let backoff = self
            .config
            .initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.config.max_backoff);
        state.backoff_until = Some(now + backoff);
        backoff
    }

    /// Penalise a peer that sent an invalid event.
    pub fn penalize(&mut self, peer: NodeId) {
        if let Some(state) = self.peers.get_mut(&peer) {
            state.reputation = (state.reputation - self.config.invalid_event_penalty).max(0.0);
        }
    }

    /// Clear the in-flight mark without scoring, e.g. on shutdown.
    pub fn release(&mut self, peer: NodeId) {
        if let Some(state) = self.peers.get_mut(&peer) {
            state.in_flight = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table() -> PeerTable {
        PeerTable::new(ReputationConfig::default(), (1..=3).map(NodeId))
    }

    #[test]
    fn test_in_flight_peers_skipped() {
        let mut peers = table();
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();

        let mut picked: Vec<NodeId> = (0..3)
            .map(|_| peers.select(&mut rng, 0, now).unwrap())
            .collect();
        picked.sort();
        assert_eq!(picked, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(peers.select(&mut rng, 0, now), None);

        peers.record_success(NodeId(2), 4);
        assert_eq!(peers.select(&mut rng, 0, now), Some(NodeId(2)));
    }

    #[test]
    fn test_failure_backs_off_exponentially() {
        let mut peers = table();
        let now = Instant::now();

        assert_eq!(peers.record_failure(NodeId(1), now), Duration::from_millis(100));
        assert_eq!(peers.record_failure(NodeId(1), now), Duration::from_millis(200));
        assert_eq!(peers.record_failure(NodeId(1), now), Duration::from_millis(400));
        for _ in 0..10 {
            peers.record_failure(NodeId(1), now);
        }
        assert_eq!(peers.record_failure(NodeId(1), now), Duration::from_secs(10));

        // backed-off peer rotates out until the backoff ends
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            let peer = peers.select(&mut rng, 0, now).unwrap();
            assert_ne!(peer, NodeId(1));
            peers.release(peer);
        }
        let later = now + Duration::from_secs(11);
        let mut seen_one = false;
        for _ in 0..200 {
            let peer = peers.select(&mut rng, 0, later).unwrap();
            seen_one |= peer == NodeId(1);
            peers.release(peer);
        }
        assert!(seen_one);
    }

    #[test]
    fn test_banned_peer_never_selected() {
        let mut peers = table();
        for _ in 0..4 {
            peers.penalize(NodeId(3));
        }
        assert!(peers.is_banned(NodeId(3)));

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let peer = peers.select(&mut rng, 0, Instant::now()).unwrap();
            assert_ne!(peer, NodeId(3));
            peers.release(peer);
        }
    }

    #[test]
    fn test_lagging_peer_chosen_less_often() {
        let mut peers = PeerTable::new(ReputationConfig::default(), [NodeId(1), NodeId(2)]);
        peers.record_success(NodeId(1), 20);
        peers.record_success(NodeId(2), 0);

        let mut rng = StdRng::seed_from_u64(4);
        let now = Instant::now();
        let mut current = 0;
        for _ in 0..1_000 {
            let peer = peers.select(&mut rng, 20, now).unwrap();
            if peer == NodeId(1) {
                current += 1;
            }
            peers.release(peer);
        }
        assert!(current > 900, "current peer picked {current} times");
    }
}

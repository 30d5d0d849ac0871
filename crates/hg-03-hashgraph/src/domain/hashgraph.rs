//! # Virtual Voting Engine
//!
//! Events are held in an arena keyed by hash; parent links are hash keys.
//! Metadata (round, witness flag, last-see vector) is computed once per event
//! for the current decided state and memoized. Fame is decided for one
//! election round at a time. When a round is decided, its consensus events
//! are ordered, consensus and ancient events are pruned, and the metadata of
//! every remaining event is recomputed with the round's judges as anchors.
//!
//! Restart: `load_snapshot` resets the engine to a decided round. Replayed
//! events are only stored until every snapshot judge and every non-ancient
//! consensus tip is present; the self-chains below the tips are then marked
//! consensus and metadata is computed exactly as a live node has it.

use super::meta::{Election, EventMeta, EventNode, LastSee};
use super::ordering::{compare_consensus, median, whitening, ConsensusClock, OrderKey};
use super::{ConsensusConfig, HashgraphError, HashgraphResult};
use crate::metrics;
use hg_01_roster::{Roster, RosterHistory};
use shared_types::{
    short_hash, ConsensusEvent, ConsensusRound, ConsensusSnapshot, EventDescriptor, EventWindow,
    Hash, NodeId, PlatformEvent, Timestamp, ROUND_FIRST, ROUND_NEGATIVE_INFINITY,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Progress of the election relative to the newest rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LivenessStatus {
    Healthy,
    /// Rounds keep being created but the election round is not decided.
    Stalled { election_round: u64, max_round: u64 },
}

/// The hashgraph consensus engine.
pub struct Hashgraph {
    config: ConsensusConfig,
    rosters: RosterHistory,
    /// Roster governing the current election.
    roster: Arc<Roster>,
    /// Every node that appears in any roster, ascending.
    members: Vec<NodeId>,
    member_index: HashMap<NodeId, usize>,

    events: HashMap<Hash, EventNode>,
    insertion_order: Vec<Hash>,
    witnesses: BTreeMap<u64, Vec<Hash>>,
    votes: HashMap<(Hash, Hash), bool>,
    election: Election,
    max_round: u64,

    last_decided_round: u64,
    last_judges: Vec<Hash>,
    consensus_tips: Vec<EventDescriptor>,
    next_consensus_order: u64,
    clock: ConsensusClock,
    window: EventWindow,

    waiting_for_snapshot: bool,
    stalled_alerted: Option<u64>,
}

impl Hashgraph {
    pub fn new(config: ConsensusConfig, rosters: RosterHistory) -> Self {
        let members: Vec<NodeId> = rosters
            .transitions()
            .iter()
            .flat_map(|t| t.roster.members())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let member_index = members.iter().enumerate().map(|(i, &m)| (m, i)).collect();
        let roster = rosters
            .roster_for_round(ROUND_FIRST)
            .unwrap_or_else(|_| rosters.latest());
        let clock = ConsensusClock::new(config.min_timestamp_increment_nanos, None);
        Self {
            config,
            rosters,
            roster,
            members,
            member_index,
            events: HashMap::new(),
            insertion_order: Vec::new(),
            witnesses: BTreeMap::new(),
            votes: HashMap::new(),
            election: Election::new(ROUND_FIRST),
            max_round: ROUND_NEGATIVE_INFINITY,
            last_decided_round: ROUND_NEGATIVE_INFINITY,
            last_judges: Vec::new(),
            consensus_tips: Vec::new(),
            next_consensus_order: 0,
            clock,
            window: EventWindow::genesis(),
            waiting_for_snapshot: false,
            stalled_alerted: None,
        }
    }

    // =========================================================================
    // INSERTION
    // =========================================================================

    /// Insert an event whose non-ancient parents are already present.
    ///
    /// Returns every round decided as a consequence, in round order.
    pub fn add_event(&mut self, event: PlatformEvent) -> HashgraphResult<Vec<ConsensusRound>> {
        let hash = event.hash();
        if self.events.contains_key(&hash) {
            return Err(HashgraphError::DuplicateEvent(hash));
        }
        if !self.member_index.contains_key(&event.creator()) {
            return Err(HashgraphError::UnknownCreator(event.creator()));
        }
        if self.window.is_ancient(event.birth_round()) {
            return Err(HashgraphError::AncientEvent {
                birth_round: event.birth_round(),
                ancient_threshold: self.window.ancient_threshold,
            });
        }

        self.events.insert(hash, EventNode::new(event));
        self.insertion_order.push(hash);
        metrics::record_event_added();

        let mut decided = if self.waiting_for_snapshot {
            if !self.snapshot_ready() {
                return Ok(Vec::new());
            }
            self.finish_snapshot_load();
            self.recalculate()
        } else {
            self.calculate_and_vote(hash)
        };

        let mut rounds = Vec::new();
        while let Some(round) = decided {
            rounds.push(round);
            decided = self.recalculate();
        }
        self.check_liveness();
        Ok(rounds)
    }

    /// Reset to the decided state captured by `snapshot`.
    pub fn load_snapshot(&mut self, snapshot: &ConsensusSnapshot) {
        self.events.clear();
        self.insertion_order.clear();
        self.witnesses.clear();
        self.votes.clear();
        self.max_round = ROUND_NEGATIVE_INFINITY;
        self.stalled_alerted = None;

        self.last_decided_round = snapshot.round;
        self.election = Election::new(snapshot.round + 1);
        self.last_judges = snapshot.judges.clone();
        self.consensus_tips = snapshot.consensus_tips.clone();
        self.next_consensus_order = snapshot.next_consensus_order;
        self.clock = ConsensusClock::new(
            self.config.min_timestamp_increment_nanos,
            snapshot.last_consensus_timestamp,
        );
        self.window = EventWindow::new(snapshot.round, self.config.rounds_non_ancient);
        self.roster = self.roster_for(snapshot.round + 1);
        self.waiting_for_snapshot =
            !self.last_judges.is_empty() || !self.consensus_tips.is_empty();

        info!(
            round = snapshot.round,
            judges = snapshot.judges.len(),
            next_order = snapshot.next_consensus_order,
            "Consensus snapshot loaded"
        );
    }

    fn snapshot_ready(&self) -> bool {
        self.last_judges.iter().all(|j| self.events.contains_key(j))
            && self
                .consensus_tips
                .iter()
                .filter(|t| !self.window.is_ancient(t.birth_round))
                .all(|t| self.events.contains_key(&t.hash))
    }

    fn finish_snapshot_load(&mut self) {
        let mut marked = 0usize;
        for tip in &self.consensus_tips {
            let mut current = Some(tip.hash);
            while let Some(hash) = current {
                match self.events.get_mut(&hash) {
                    Some(node) if !node.consensus => {
                        node.consensus = true;
                        marked += 1;
                        current = node.event.self_parent().map(|p| p.hash);
                    }
                    _ => break,
                }
            }
        }
        self.waiting_for_snapshot = false;
        info!(
            round = self.last_decided_round,
            marked_consensus = marked,
            "All snapshot judges found, resuming consensus"
        );
    }

    // =========================================================================
    // METADATA
    // =========================================================================

    /// Recompute the metadata of all events under the current decided state.
    fn recalculate(&mut self) -> Option<ConsensusRound> {
        self.votes.clear();
        self.witnesses.clear();
        self.election = Election::new(self.last_decided_round + 1);
        self.max_round = ROUND_NEGATIVE_INFINITY;

        let window = self.window;
        let last_judges = &self.last_judges;
        let events = &mut self.events;
        self.insertion_order.retain(|hash| {
            let keep = match events.get(hash) {
                Some(node) => {
                    last_judges.contains(hash)
                        || (!node.consensus && !window.is_ancient(node.event.birth_round()))
                }
                None => return false,
            };
            if !keep {
                events.remove(hash);
            }
            keep
        });
        for node in self.events.values_mut() {
            node.meta = None;
        }

        let order = self.insertion_order.clone();
        for hash in order {
            if let Some(round) = self.calculate_and_vote(hash) {
                return Some(round);
            }
        }
        None
    }

    fn calculate_and_vote(&mut self, hash: Hash) -> Option<ConsensusRound> {
        let meta = self.calculate_metadata(&hash)?;
        let (round, witness) = (meta.round, meta.witness);
        if let Some(node) = self.events.get_mut(&hash) {
            node.meta = Some(meta);
        }
        self.max_round = self.max_round.max(round);
        if !witness {
            return None;
        }

        self.witnesses.entry(round).or_default().push(hash);
        if round == self.election.round {
            self.election.candidates.push(hash);
            self.collect_existing_votes(hash);
        } else if round > self.election.round {
            self.vote_in_election(hash);
        }
        // witnesses below the election round are never famous

        if self.election.is_decided() {
            Some(self.round_decided())
        } else {
            None
        }
    }

    fn calculate_metadata(&self, hash: &Hash) -> Option<EventMeta> {
        let node = self.events.get(hash)?;
        let event = &node.event;
        let members = self.members.len();

        let parent_rounds: Vec<u64> = event
            .parents()
            .filter(|p| !self.window.is_ancient(p.birth_round))
            .map(|p| self.round_of_present(&p.hash))
            .collect();

        if self.last_judges.contains(hash)
            && parent_rounds.iter().all(|&r| r == ROUND_NEGATIVE_INFINITY)
        {
            return Some(EventMeta {
                round: self.last_decided_round,
                witness: true,
                last_see: self.own_last_see(event.creator(), hash),
            });
        }
        if node.consensus || self.window.is_ancient(event.birth_round()) {
            return Some(EventMeta::irrelevant(members));
        }

        if event.parents().next().is_none() {
            if self.last_decided_round != ROUND_NEGATIVE_INFINITY {
                return Some(EventMeta::irrelevant(members));
            }
            return Some(EventMeta {
                round: ROUND_FIRST,
                witness: true,
                last_see: self.own_last_see(event.creator(), hash),
            });
        }

        let parent_round = parent_rounds
            .iter()
            .copied()
            .max()
            .unwrap_or(ROUND_NEGATIVE_INFINITY);
        if parent_round == ROUND_NEGATIVE_INFINITY {
            return Some(EventMeta::irrelevant(members));
        }

        let last_see = self.merge_last_see(hash, event);
        let parents_agree = parent_rounds.windows(2).all(|w| w[0] == w[1]);
        let round = if !parents_agree && !self.roster.node_has_supermajority() {
            parent_round
        } else if self.strongly_sees_supermajority(hash, &last_see, parent_round) {
            parent_round + 1
        } else {
            parent_round
        };

        let self_parent_round = event
            .self_parent()
            .filter(|p| !self.window.is_ancient(p.birth_round))
            .map(|p| self.round_of_present(&p.hash))
            .unwrap_or(ROUND_NEGATIVE_INFINITY);

        Some(EventMeta {
            round,
            witness: self_parent_round < round,
            last_see,
        })
    }

    fn own_last_see(&self, creator: NodeId, hash: &Hash) -> Vec<LastSee> {
        let mut last_see = vec![LastSee::Nothing; self.members.len()];
        if let Some(&i) = self.member_index.get(&creator) {
            last_see[i] = LastSee::Sees(*hash);
        }
        last_see
    }

    fn merge_last_see(&self, hash: &Hash, event: &PlatformEvent) -> Vec<LastSee> {
        let mut last_see = vec![LastSee::Nothing; self.members.len()];
        for parent in event.parents() {
            let Some(meta) = self.relevant_meta(&parent.hash) else {
                continue;
            };
            for (slot, seen) in last_see.iter_mut().zip(&meta.last_see) {
                *slot = self.combine(*slot, *seen);
            }
        }
        if let Some(&i) = self.member_index.get(&event.creator()) {
            last_see[i] = match last_see[i] {
                LastSee::Fork => LastSee::Fork,
                LastSee::Sees(l) if !self.is_self_ancestor(&l, hash) => LastSee::Fork,
                _ => LastSee::Sees(*hash),
            };
        }
        last_see
    }

    fn combine(&self, a: LastSee, b: LastSee) -> LastSee {
        match (a, b) {
            (LastSee::Fork, _) | (_, LastSee::Fork) => LastSee::Fork,
            (LastSee::Nothing, x) | (x, LastSee::Nothing) => x,
            (LastSee::Sees(p), LastSee::Sees(q)) => {
                if p == q || self.is_self_ancestor(&p, &q) {
                    LastSee::Sees(q)
                } else if self.is_self_ancestor(&q, &p) {
                    LastSee::Sees(p)
                } else {
                    LastSee::Fork
                }
            }
        }
    }

    /// True if `ancestor` is `descendant` or on its self-parent chain.
    fn is_self_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> bool {
        let Some(target) = self.events.get(ancestor) else {
            return false;
        };
        let (creator, generation) = (target.event.creator(), target.event.generation());
        let mut current = *descendant;
        loop {
            if current == *ancestor {
                return true;
            }
            let Some(node) = self.events.get(&current) else {
                return false;
            };
            if node.event.creator() != creator || node.event.generation() <= generation {
                return false;
            }
            match node.event.self_parent() {
                Some(parent) => current = parent.hash,
                None => return false,
            }
        }
    }

    /// `x` (described by its last-see vector) sees `y`.
    fn sees(&self, last_see: &[LastSee], y: &Hash) -> bool {
        let Some(creator) = self.events.get(y).map(|n| n.event.creator()) else {
            return false;
        };
        let Some(&i) = self.member_index.get(&creator) else {
            return false;
        };
        matches!(last_see[i], LastSee::Sees(l) if self.is_self_ancestor(y, &l))
    }

    /// `x` sees `y` through intermediates holding a supermajority of weight.
    fn strongly_sees(&self, x: &Hash, x_last_see: &[LastSee], y: &Hash) -> bool {
        let mut weight = 0u64;
        for (i, seen) in x_last_see.iter().enumerate() {
            let LastSee::Sees(z) = seen else {
                continue;
            };
            let z_last_see = if z == x {
                x_last_see
            } else {
                match self.relevant_meta(z) {
                    Some(meta) => &meta.last_see,
                    None => continue,
                }
            };
            if self.sees(z_last_see, y) {
                weight = weight.saturating_add(self.roster.weight_of(self.members[i]));
            }
        }
        self.roster.is_supermajority(weight)
    }

    fn strongly_sees_supermajority(&self, x: &Hash, last_see: &[LastSee], round: u64) -> bool {
        let Some(witnesses) = self.witnesses.get(&round) else {
            return false;
        };
        let mut counted = HashSet::new();
        let mut weight = 0u64;
        for w in witnesses {
            let Some(creator) = self.events.get(w).map(|n| n.event.creator()) else {
                continue;
            };
            if counted.contains(&creator) || !self.strongly_sees(x, last_see, w) {
                continue;
            }
            counted.insert(creator);
            weight = weight.saturating_add(self.roster.weight_of(creator));
        }
        self.roster.is_supermajority(weight)
    }

    /// Witnesses of `round` strongly seen by `voter`, at most one per creator.
    fn strongly_seen_witnesses(&self, voter: &Hash, round: u64) -> Vec<Hash> {
        let (Some(meta), Some(witnesses)) = (self.relevant_meta(voter), self.witnesses.get(&round))
        else {
            return Vec::new();
        };
        let mut by_creator: BTreeMap<NodeId, Hash> = BTreeMap::new();
        for w in witnesses {
            let Some(creator) = self.events.get(w).map(|n| n.event.creator()) else {
                continue;
            };
            if !by_creator.contains_key(&creator) && self.strongly_sees(voter, &meta.last_see, w) {
                by_creator.insert(creator, *w);
            }
        }
        by_creator.into_values().collect()
    }

    fn relevant_meta(&self, hash: &Hash) -> Option<&EventMeta> {
        self.events
            .get(hash)
            .and_then(|n| n.meta.as_ref())
            .filter(|m| m.is_relevant())
    }

    fn round_of_present(&self, hash: &Hash) -> u64 {
        self.events
            .get(hash)
            .map(EventNode::round)
            .unwrap_or(ROUND_NEGATIVE_INFINITY)
    }

    fn roster_for(&self, round: u64) -> Arc<Roster> {
        self.rosters
            .roster_for_round(round)
            .unwrap_or_else(|_| self.rosters.latest())
    }

    // =========================================================================
    // VOTING
    // =========================================================================

    fn is_coin_round(&self, diff: u64) -> bool {
        self.config.coin_freq > 0 && diff % self.config.coin_freq == 0
    }

    fn is_decisive(&self, yes: u64, no: u64) -> bool {
        self.roster.is_supermajority(yes) || self.roster.is_supermajority(no)
    }

    /// Pseudo-random bit taken from the middle of the voter's signature.
    fn coin(&self, voter: &Hash) -> bool {
        self.events
            .get(voter)
            .map(|n| n.event.signature()[32] & 1 == 1)
            .unwrap_or(false)
    }

    fn vote(&mut self, voter: Hash, candidate: Hash) -> bool {
        if let Some(&vote) = self.votes.get(&(voter, candidate)) {
            return vote;
        }
        let voter_round = self.round_of_present(&voter);
        let diff = voter_round.saturating_sub(self.election.round);
        let vote = if diff <= 1 {
            self.relevant_meta(&voter)
                .map(|m| self.sees(&m.last_see, &candidate))
                .unwrap_or(false)
        } else {
            let (yes, no) = self.tally(voter, candidate, voter_round - 1);
            if self.is_coin_round(diff) && !self.is_decisive(yes, no) {
                metrics::record_coin_vote();
                self.coin(&voter)
            } else {
                yes >= no
            }
        };
        self.votes.insert((voter, candidate), vote);
        vote
    }

    /// Weight voting yes and no among the witnesses of `round` the voter strongly sees.
    fn tally(&mut self, voter: Hash, candidate: Hash, round: u64) -> (u64, u64) {
        let (mut yes, mut no) = (0u64, 0u64);
        for w in self.strongly_seen_witnesses(&voter, round) {
            let weight = self
                .events
                .get(&w)
                .map(|n| self.roster.weight_of(n.event.creator()))
                .unwrap_or(0);
            if self.vote(w, candidate) {
                yes = yes.saturating_add(weight);
            } else {
                no = no.saturating_add(weight);
            }
        }
        (yes, no)
    }

    /// Let `voter` try to decide the fame of `candidate`.
    fn try_decide(&mut self, voter: Hash, candidate: Hash) -> bool {
        let voter_round = self.round_of_present(&voter);
        let diff = voter_round.saturating_sub(self.election.round);
        if diff < 2 || self.is_coin_round(diff) {
            return false;
        }
        let (yes, no) = self.tally(voter, candidate, voter_round - 1);
        if !self.is_decisive(yes, no) {
            return false;
        }
        let famous = yes >= no;
        self.election.fame.insert(candidate, famous);
        debug!(
            round = self.election.round,
            witness = %short_hash(&candidate),
            decided_by = %short_hash(&voter),
            famous,
            "Fame decided"
        );
        true
    }

    fn vote_in_election(&mut self, voter: Hash) {
        for candidate in self.election.undecided() {
            self.try_decide(voter, candidate);
        }
    }

    fn collect_existing_votes(&mut self, candidate: Hash) {
        let voters: Vec<Hash> = self
            .witnesses
            .range(self.election.round + 1..)
            .flat_map(|(_, ws)| ws.iter().copied())
            .collect();
        for voter in voters {
            if self.try_decide(voter, candidate) {
                break;
            }
        }
    }

    // =========================================================================
    // CONSENSUS ORDER
    // =========================================================================

    fn round_decided(&mut self) -> ConsensusRound {
        let round = self.election.round;

        let mut by_creator: BTreeMap<NodeId, Hash> = BTreeMap::new();
        for famous in self.election.famous() {
            let Some(creator) = self.events.get(famous).map(|n| n.event.creator()) else {
                continue;
            };
            by_creator
                .entry(creator)
                .and_modify(|h| {
                    if *famous < *h {
                        *h = *famous;
                    }
                })
                .or_insert(*famous);
        }
        let mut judges: Vec<Hash> = by_creator.into_values().collect();
        judges.sort();
        self.check_judges(round, &judges);

        let consensus = self.common_ancestors(&judges);
        let mut received = self.received_times(&judges, &consensus);
        let mut ordered: Vec<(Timestamp, u64, Hash)> = consensus
            .iter()
            .map(|hash| {
                let mut times = received.remove(hash).unwrap_or_default();
                let event = self.events.get(hash).map(|n| &n.event);
                let fallback = event.map(|e| e.time_created());
                let generation = event.map(|e| e.generation()).unwrap_or(0);
                (median(&mut times).or(fallback).unwrap_or(0), generation, *hash)
            })
            .collect();
        let white = whitening(&judges);
        ordered.sort_by(|a, b| {
            compare_consensus(
                OrderKey {
                    preliminary: a.0,
                    generation: a.1,
                    hash: &a.2,
                },
                OrderKey {
                    preliminary: b.0,
                    generation: b.1,
                    hash: &b.2,
                },
                &white,
            )
        });

        let count = ordered.len();
        let mut events = Vec::with_capacity(count);
        for (i, (preliminary, _, hash)) in ordered.into_iter().enumerate() {
            let Some(node) = self.events.get_mut(&hash) else {
                continue;
            };
            node.consensus = true;
            let consensus_timestamp = self
                .clock
                .assign(preliminary, node.event.transactions().len());
            events.push(ConsensusEvent {
                event: node.event.clone(),
                consensus_order: self.next_consensus_order,
                consensus_timestamp,
                round_received: round,
                last_in_round: i + 1 == count,
            });
            self.next_consensus_order += 1;
        }

        let consensus_timestamp = match events.last() {
            Some(last) => last.consensus_timestamp,
            None => {
                let timestamp = match self.clock.minimum_next() {
                    Some(next) => next,
                    None => {
                        let mut times: Vec<Timestamp> = judges
                            .iter()
                            .filter_map(|j| self.events.get(j).map(|n| n.event.time_created()))
                            .collect();
                        median(&mut times).unwrap_or(0)
                    }
                };
                self.clock.assign(timestamp, 1)
            }
        };

        self.update_consensus_tips(&events);
        self.last_decided_round = round;
        self.last_judges = judges.clone();
        self.window = EventWindow::new(round, self.config.rounds_non_ancient);
        let window = self.window;
        self.consensus_tips
            .retain(|t| !window.is_ancient(t.birth_round));
        self.roster = self.roster_for(round + 1);

        metrics::record_round_decided(round, events.len());
        info!(
            round,
            judges = judges.len(),
            consensus_events = events.len(),
            next_order = self.next_consensus_order,
            ancient_threshold = window.ancient_threshold,
            "Round decided"
        );

        ConsensusRound {
            round,
            judges,
            events,
            consensus_timestamp,
            snapshot: self.snapshot(),
            event_window: window,
        }
    }

    fn check_judges(&self, round: u64, judges: &[Hash]) {
        if judges.is_empty() {
            warn!(round, "No judges in decided round");
            return;
        }
        let weight: u64 = judges
            .iter()
            .filter_map(|j| self.events.get(j))
            .map(|n| self.roster.weight_of(n.event.creator()))
            .sum();
        if !self.roster.is_supermajority(weight) {
            warn!(
                round,
                judge_weight = weight,
                total_weight = self.roster.total_weight(),
                "Judges hold less than a supermajority of weight"
            );
        }
    }

    /// Non-consensus, non-ancient ancestors of `start`, itself included.
    fn ancestors(&self, start: &Hash) -> HashSet<Hash> {
        let mut found = HashSet::new();
        let mut stack = vec![*start];
        while let Some(hash) = stack.pop() {
            let Some(node) = self.events.get(&hash) else {
                continue;
            };
            if node.consensus || self.window.is_ancient(node.event.birth_round()) {
                continue;
            }
            if found.insert(hash) {
                stack.extend(node.event.parents().map(|p| p.hash));
            }
        }
        found
    }

    fn common_ancestors(&self, judges: &[Hash]) -> HashSet<Hash> {
        let mut common: Option<HashSet<Hash>> = None;
        for judge in judges {
            let ancestors = self.ancestors(judge);
            common = Some(match common {
                None => ancestors,
                Some(c) => c.intersection(&ancestors).copied().collect(),
            });
        }
        common.unwrap_or_default()
    }

    /// For each judge, the creation time of the earliest event on the judge's
    /// self-chain that has the target as an ancestor.
    fn received_times(
        &self,
        judges: &[Hash],
        targets: &HashSet<Hash>,
    ) -> HashMap<Hash, Vec<Timestamp>> {
        let mut times: HashMap<Hash, Vec<Timestamp>> = HashMap::new();
        for judge in judges {
            let mut chain = Vec::new();
            let mut current = Some(*judge);
            while let Some(hash) = current {
                match self.events.get(&hash) {
                    Some(node)
                        if !node.consensus && !self.window.is_ancient(node.event.birth_round()) =>
                    {
                        chain.push(node);
                        current = node.event.self_parent().map(|p| p.hash);
                    }
                    _ => break,
                }
            }

            let mut visited = HashSet::new();
            for link in chain.into_iter().rev() {
                let time = link.event.time_created();
                let mut stack = vec![link.event.hash()];
                while let Some(hash) = stack.pop() {
                    let Some(node) = self.events.get(&hash) else {
                        continue;
                    };
                    if node.consensus
                        || self.window.is_ancient(node.event.birth_round())
                        || !visited.insert(hash)
                    {
                        continue;
                    }
                    if targets.contains(&hash) {
                        times.entry(hash).or_default().push(time);
                    }
                    stack.extend(node.event.parents().map(|p| p.hash));
                }
            }
        }
        times
    }

    fn update_consensus_tips(&mut self, events: &[ConsensusEvent]) {
        let superseded: HashSet<Hash> = events
            .iter()
            .filter_map(|e| e.event.self_parent().map(|p| p.hash))
            .collect();
        let mut tips: Vec<EventDescriptor> = self
            .consensus_tips
            .drain(..)
            .chain(events.iter().map(|e| e.event.descriptor()))
            .filter(|d| !superseded.contains(&d.hash))
            .collect();
        tips.sort_by(|a, b| a.creator.cmp(&b.creator).then(a.hash.cmp(&b.hash)));
        tips.dedup_by_key(|d| d.hash);
        self.consensus_tips = tips;
    }

    fn check_liveness(&mut self) {
        if let LivenessStatus::Stalled {
            election_round,
            max_round,
        } = self.liveness()
        {
            if self.stalled_alerted != Some(election_round) {
                self.stalled_alerted = Some(election_round);
                metrics::record_stalled_round();
                warn!(
                    election_round,
                    max_round,
                    threshold = self.config.stalled_round_threshold,
                    "Stalled round: fame undecided while newer rounds accumulate"
                );
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn liveness(&self) -> LivenessStatus {
        let lag = self.max_round.saturating_sub(self.election.round);
        if !self.waiting_for_snapshot && lag > self.config.stalled_round_threshold {
            LivenessStatus::Stalled {
                election_round: self.election.round,
                max_round: self.max_round,
            }
        } else {
            LivenessStatus::Healthy
        }
    }

    /// Data needed to resume from the latest decided round.
    pub fn snapshot(&self) -> ConsensusSnapshot {
        ConsensusSnapshot {
            round: self.last_decided_round,
            judges: self.last_judges.clone(),
            next_consensus_order: self.next_consensus_order,
            last_consensus_timestamp: self.clock.last_transaction_time(),
            consensus_tips: self.consensus_tips.clone(),
        }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.events.contains_key(hash)
    }

    pub fn get(&self, hash: &Hash) -> Option<&PlatformEvent> {
        self.events.get(hash).map(|n| &n.event)
    }

    /// Number of events held (non-consensus, non-ancient, plus the last judges).
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn event_window(&self) -> EventWindow {
        self.window
    }

    pub fn election_round(&self) -> u64 {
        self.election.round
    }

    pub fn max_round(&self) -> u64 {
        self.max_round
    }

    pub fn last_decided_round(&self) -> u64 {
        self.last_decided_round
    }

    pub fn last_judges(&self) -> &[Hash] {
        &self.last_judges
    }

    pub fn is_waiting_for_snapshot(&self) -> bool {
        self.waiting_for_snapshot
    }

    /// Round created of a held event under the current decided state.
    pub fn round_of(&self, hash: &Hash) -> Option<u64> {
        self.events
            .get(hash)
            .and_then(|n| n.meta.as_ref())
            .map(|m| m.round)
    }

    pub fn is_witness(&self, hash: &Hash) -> Option<bool> {
        self.events
            .get(hash)
            .and_then(|n| n.meta.as_ref())
            .map(|m| m.witness)
    }

    /// Decided fame of a witness in the current election.
    pub fn fame(&self, hash: &Hash) -> Option<bool> {
        self.election.fame.get(hash).copied()
    }

    /// Schedule a roster change effective from `round`.
    pub fn add_roster_transition(&mut self, round: u64, roster: Roster) -> HashgraphResult<()> {
        for member in roster.members() {
            if !self.member_index.contains_key(&member) {
                self.member_index.insert(member, self.members.len());
                self.members.push(member);
                for node in self.events.values_mut() {
                    if let Some(meta) = node.meta.as_mut() {
                        meta.last_see.push(LastSee::Nothing);
                    }
                }
            }
        }
        self.rosters.add_transition(round, roster)?;
        self.roster = self.roster_for(self.election.round);
        Ok(())
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }
}

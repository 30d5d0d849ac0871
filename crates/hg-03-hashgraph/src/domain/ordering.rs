//! Consensus ordering rules
//!
//! Median received times, generation and whitened hash tie-breaks, and the
//! minimum timestamp spacing that keeps consensus timestamps strictly
//! increasing per transaction.

use shared_types::{Hash, Timestamp};
use std::cmp::Ordering;

/// XOR of all judge hashes.
pub fn whitening(judges: &[Hash]) -> Hash {
    let mut out = [0u8; 32];
    for judge in judges {
        for (o, b) in out.iter_mut().zip(judge.iter()) {
            *o ^= b;
        }
    }
    out
}

/// Upper median of the given times.
pub fn median(times: &mut [Timestamp]) -> Option<Timestamp> {
    if times.is_empty() {
        return None;
    }
    times.sort_unstable();
    Some(times[times.len() / 2])
}

/// Sort key of an event within its received round.
#[derive(Clone, Copy, Debug)]
pub struct OrderKey<'a> {
    pub preliminary: Timestamp,
    pub generation: u64,
    pub hash: &'a Hash,
}

/// Compare two events by preliminary timestamp, then generation, then
/// whitened hash.
///
/// An ancestor never has a later median received time than its descendant,
/// and always has a lower generation, so the order is topological.
pub fn compare_consensus(a: OrderKey<'_>, b: OrderKey<'_>, whitening: &Hash) -> Ordering {
    a.preliminary
        .cmp(&b.preliminary)
        .then(a.generation.cmp(&b.generation))
        .then_with(|| {
            let wa = a.hash.iter().zip(whitening.iter()).map(|(x, w)| x ^ w);
            let wb = b.hash.iter().zip(whitening.iter()).map(|(x, w)| x ^ w);
            wa.cmp(wb)
        })
}

/// Assigns final consensus timestamps.
#[derive(Clone, Debug)]
pub struct ConsensusClock {
    increment: u64,
    last_transaction_time: Option<Timestamp>,
}

impl ConsensusClock {
    pub fn new(increment: u64, last_transaction_time: Option<Timestamp>) -> Self {
        Self {
            increment,
            last_transaction_time,
        }
    }

    /// Earliest timestamp the next event may receive.
    pub fn minimum_next(&self) -> Option<Timestamp> {
        self.last_transaction_time
            .map(|last| last.saturating_add(self.increment))
    }

    /// Final timestamp for an event with `transaction_count` transactions.
    ///
    /// Each transaction after the first is `increment` later than the
    /// previous one; the clock advances to the last transaction's time.
    pub fn assign(&mut self, preliminary: Timestamp, transaction_count: usize) -> Timestamp {
        let timestamp = match self.minimum_next() {
            Some(min) if preliminary < min => min,
            _ => preliminary,
        };
        let extra = (transaction_count.saturating_sub(1) as u64).saturating_mul(self.increment);
        self.last_transaction_time = Some(timestamp.saturating_add(extra));
        timestamp
    }

    pub fn last_transaction_time(&self) -> Option<Timestamp> {
        self.last_transaction_time
    }
}

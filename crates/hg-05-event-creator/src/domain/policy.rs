//! Creation policy
//!
//! Whether to create an event now, and the parent-derived fields of the
//! event if so.

use super::{CreatorConfig, TrackedEvent};
use shared_types::{EventDescriptor, EventWindow, Timestamp};
use std::time::Duration;

/// Consensus and intake load seen when deciding to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreationPressure {
    pub intake_queue: usize,
    pub election_round: u64,
    pub max_round: u64,
}

impl CreationPressure {
    pub fn undecided_rounds(&self) -> u64 {
        self.max_round.saturating_sub(self.election_round)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    IntakeBacklog(usize),
    UndecidedRounds(u64),
    NoNewInformation,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationDecision {
    Create,
    Skip(SkipReason),
}

/// Inputs of one creation attempt.
#[derive(Debug, Clone, Copy)]
pub struct CreationContext {
    pub has_self_event: bool,
    pub has_new_information: bool,
    pub has_transactions: bool,
    /// Time since our last event, `None` before the first.
    pub since_last_event: Option<Duration>,
    pub pressure: CreationPressure,
}

pub fn decide(config: &CreatorConfig, ctx: &CreationContext) -> CreationDecision {
    if ctx.pressure.intake_queue > config.max_intake_queue {
        return CreationDecision::Skip(SkipReason::IntakeBacklog(ctx.pressure.intake_queue));
    }
    let undecided = ctx.pressure.undecided_rounds();
    if undecided > config.max_undecided_rounds {
        return CreationDecision::Skip(SkipReason::UndecidedRounds(undecided));
    }
    if !ctx.has_self_event {
        return CreationDecision::Create;
    }
    if !ctx.has_new_information {
        return CreationDecision::Skip(SkipReason::NoNewInformation);
    }
    let heartbeat_due = ctx
        .since_last_event
        .map_or(true, |elapsed| elapsed >= config.heartbeat);
    if ctx.has_transactions || heartbeat_due {
        CreationDecision::Create
    } else {
        CreationDecision::Skip(SkipReason::Idle)
    }
}

/// No lower than the pending round nor any parent's birth round.
pub fn birth_round(
    window: &EventWindow,
    self_parent: Option<&EventDescriptor>,
    other_parent: Option<&EventDescriptor>,
) -> u64 {
    self_parent
        .into_iter()
        .chain(other_parent)
        .map(|p| p.birth_round)
        .fold(window.pending_round(), u64::max)
}

/// Strictly after the self-parent even if the local clock went backwards.
pub fn time_created(now: Timestamp, self_parent: Option<&TrackedEvent>) -> Timestamp {
    match self_parent {
        Some(parent) => now.max(parent.time_created + 1),
        None => now,
    }
}

use super::ValidationError;
use shared_types::{ConsensusRound, Hash};

/// Result of submitting one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Inserted, along with any orphans it released. Carries the rounds
    /// decided as a result.
    Accepted { consensus_rounds: Vec<ConsensusRound> },
    /// Already inserted or buffered.
    Duplicate,
    /// Buffered until the listed parents arrive.
    Orphan { missing: Vec<Hash> },
    Invalid(ValidationError),
    /// Birth round below the ancient threshold.
    Ancient,
}

impl IntakeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IntakeOutcome::Accepted { .. })
    }

    /// Rounds decided by this submission, empty unless accepted.
    pub fn consensus_rounds(&self) -> &[ConsensusRound] {
        match self {
            IntakeOutcome::Accepted { consensus_rounds } => consensus_rounds,
            _ => &[],
        }
    }
}

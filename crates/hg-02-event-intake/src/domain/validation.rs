//! Stateless event checks
//!
//! Everything that can be decided from the event alone, before signatures
//! or parents are looked at.

use super::{IntakeConfig, ValidationError};
use shared_types::UnsignedEvent;

pub fn validate_internal(
    event: &UnsignedEvent,
    config: &IntakeConfig,
) -> Result<(), ValidationError> {
    check_transactions(event, config)?;
    check_parent_creators(event)?;
    check_birth_round(event)
}

fn check_transactions(event: &UnsignedEvent, config: &IntakeConfig) -> Result<(), ValidationError> {
    if event.transactions.len() > config.max_transactions_per_event {
        return Err(ValidationError::TooManyTransactions {
            count: event.transactions.len(),
            max: config.max_transactions_per_event,
        });
    }
    if let Some(index) = event.transactions.iter().position(|tx| tx.is_empty()) {
        return Err(ValidationError::EmptyTransaction { index });
    }
    let bytes = event.transaction_bytes();
    if bytes > config.max_transaction_bytes_per_event {
        return Err(ValidationError::TooManyTransactionBytes {
            bytes,
            max: config.max_transaction_bytes_per_event,
        });
    }
    Ok(())
}

fn check_parent_creators(event: &UnsignedEvent) -> Result<(), ValidationError> {
    if let Some(self_parent) = &event.self_parent {
        if self_parent.creator != event.creator {
            return Err(ValidationError::ForeignSelfParent {
                creator: event.creator,
                parent_creator: self_parent.creator,
            });
        }
    }
    if let Some(other_parent) = &event.other_parent {
        if other_parent.creator == event.creator {
            // two parents by one creator, or a lone other-parent by ourselves
            return Err(match &event.self_parent {
                Some(_) => ValidationError::DuplicateParentCreator(event.creator),
                None => ValidationError::OtherParentIsSelf(event.creator),
            });
        }
    }
    Ok(())
}

fn check_birth_round(event: &UnsignedEvent) -> Result<(), ValidationError> {
    let max_parent_birth_round = event.parents().map(|p| p.birth_round).max().unwrap_or(0);
    if event.birth_round < max_parent_birth_round {
        return Err(ValidationError::BirthRoundBelowParents {
            birth_round: event.birth_round,
            max_parent_birth_round,
        });
    }
    Ok(())
}

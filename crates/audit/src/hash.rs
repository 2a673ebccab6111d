//! Hash chain over outcome records
//!
//! Each record stores the hash of its predecessor, so an edited or removed
//! line in the audit file is detected when the file is reopened.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::outcome::Outcome;

/// `prev_hash` of the first record
pub const GENESIS: &str = "GENESIS";

/// SHA256 of the record content, excluding the `hash` field itself.
///
/// Every variable-length field is length-prefixed and every optional field
/// carries a presence tag, so text cannot move across field boundaries
/// without changing the hash.
pub fn calculate_outcome_hash(outcome: &Outcome) -> String {
    let mut hasher = Sha256::new();

    hasher.update(outcome.sequence.to_le_bytes());
    update_field(&mut hasher, &outcome.prev_hash);
    update_field(&mut hasher, &outcome.transaction_id);
    update_field(&mut hasher, &outcome.account_id);
    update_field(&mut hasher, &outcome.transaction_type.to_string());
    update_field(&mut hasher, &outcome.amount.value().to_string());
    update_field(&mut hasher, outcome.currency.code());
    update_optional(&mut hasher, outcome.risk_level.map(|level| level.to_string()).as_deref());

    hasher.update((outcome.risk_factors.len() as u64).to_le_bytes());
    for factor in &outcome.risk_factors {
        update_field(&mut hasher, factor);
    }

    update_field(&mut hasher, &outcome.status.to_string());
    update_optional(&mut hasher, outcome.approved_by.as_deref());
    update_field(&mut hasher, &outcome.decided_at.to_rfc3339());
    update_optional(&mut hasher, outcome.note.as_deref());

    hex::encode(hasher.finalize())
}

fn update_field(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn update_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            update_field(hasher, value);
        }
        None => hasher.update([0u8]),
    }
}

/// Verify chain links, hashes and sequence numbers
pub fn verify_chain(outcomes: &[Outcome]) -> Result<(), ChainError> {
    let mut prev_hash = GENESIS.to_string();

    for (i, outcome) in outcomes.iter().enumerate() {
        let expected_sequence = i as u64 + 1;
        if outcome.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: outcome.sequence,
            });
        }

        if outcome.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: outcome.sequence,
                expected: prev_hash,
                actual: outcome.prev_hash.clone(),
            });
        }

        let calculated = calculate_outcome_hash(outcome);
        if outcome.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: outcome.sequence,
                expected: calculated,
                actual: outcome.hash.clone(),
            });
        }

        prev_hash = outcome.hash.clone();
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },
}

//! Audit errors

use thiserror::Error;

use crate::hash::ChainError;

/// Errors from the audit ledger
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to write audit record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Corrupt audit file at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("Audit chain broken: {0}")]
    Chain(#[from] ChainError),

    #[error("Total of {status} amounts in {currency} overflows")]
    TotalOverflow { status: String, currency: String },

    #[error("Audit file is in an unknown state after a failed append; reopen it to continue")]
    SinkFailed,
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;

//! Approval errors

use thiserror::Error;

/// Errors from the human-interaction transport
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Review channel closed")]
    Closed,

    #[error("Review transport error: {0}")]
    Transport(String),
}

/// Errors from the confirmation state machine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("Invalid verdict: {0:?} (expected approve, deny or investigate)")]
    InvalidVerdict(String),

    #[error("Review for {0} is already resolved")]
    AlreadyResolved(String),

    #[error("No active investigation hold for {0}")]
    NoActiveHold(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

//! Risk layer errors

use thiserror::Error;

use crate::level::RiskLevel;

/// Scorer contract violations found while validating an assessment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Invalid risk level from scorer: {0:?}")]
    InvalidRiskLevel(String),

    #[error("Scorer returned {0} risk without any risk factors")]
    MissingRiskFactors(RiskLevel),
}

/// The scorer could not produce an assessment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Risk scorer timed out after {0}ms")]
    Timeout(u64),

    #[error("Risk scorer unavailable: {0}")]
    Unavailable(String),
}

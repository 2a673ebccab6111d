//! Scorer trait - interface for external risk scorers

use async_trait::async_trait;
use txguard_core::{AccountProfile, Transaction};

use crate::assessment::RawAssessment;
use crate::error::ScoringError;

/// External risk scorer.
///
/// Implementations may call remote services. Callers bound every call with
/// a timeout; an implementation does not need its own.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    /// Scorer name for logging
    fn name(&self) -> &str;

    /// Assess one transaction against its sender's profile
    async fn assess(
        &self,
        transaction: &Transaction,
        profile: &AccountProfile,
    ) -> Result<RawAssessment, ScoringError>;
}

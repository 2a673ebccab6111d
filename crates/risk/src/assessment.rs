//! Risk assessments - the scorer's wire shape and its validated form

use serde::{Deserialize, Serialize};

use crate::error::{RiskError, ScoringError};
use crate::level::RiskLevel;

/// Assessment exactly as a scorer returns it.
///
/// `risk_level` stays a string here: scorers are external and may return
/// anything, so validation happens in [`RiskAssessment::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssessment {
    pub risk_level: String,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub risk_explanation: String,
}

impl RawAssessment {
    pub fn new(
        risk_level: impl Into<String>,
        risk_factors: Vec<String>,
        risk_explanation: impl Into<String>,
    ) -> Self {
        Self {
            risk_level: risk_level.into(),
            risk_factors,
            risk_explanation: risk_explanation.into(),
        }
    }
}

/// A validated risk assessment, produced once per transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Ordered by significance, may repeat
    pub factors: Vec<String>,
    pub rationale: String,
    /// True when the scorer was unavailable and the level was escalated
    #[serde(default)]
    pub fail_closed: bool,
}

impl RiskAssessment {
    /// Validate a scorer response.
    ///
    /// Fails when the level is not one of the four defined values, or when a
    /// level above LOW comes without any factors.
    pub fn from_raw(raw: RawAssessment) -> Result<Self, RiskError> {
        let level = RiskLevel::parse(&raw.risk_level)?;

        if level > RiskLevel::Low && raw.risk_factors.is_empty() {
            return Err(RiskError::MissingRiskFactors(level));
        }

        Ok(Self {
            level,
            factors: raw.risk_factors,
            rationale: raw.risk_explanation,
            fail_closed: false,
        })
    }

    /// Assessment used when scoring failed: unscored transactions are CRITICAL
    pub fn fail_closed(cause: &ScoringError) -> Self {
        Self {
            level: RiskLevel::Critical,
            factors: vec![format!("Risk scoring unavailable: {}", cause)],
            rationale: "The risk scorer did not return an assessment; escalated to human review."
                .to_string(),
            fail_closed: true,
        }
    }
}

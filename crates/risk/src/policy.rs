//! Approval policy - fixed mapping from risk level to approval path

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::Display;

use crate::assessment::RiskAssessment;
use crate::level::RiskLevel;

/// Which approval path a transaction takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingDecision {
    /// Approved without human involvement
    AutoApprove,
    /// Held until a human confirms
    RequireHuman,
}

/// Approval Policy
///
/// | Risk level | Route          |
/// |------------|----------------|
/// | LOW        | AUTO_APPROVE   |
/// | MEDIUM     | AUTO_APPROVE   |
/// | HIGH       | REQUIRE_HUMAN  |
/// | CRITICAL   | REQUIRE_HUMAN  |
///
/// The table is fixed policy. It is not configurable per transaction.
pub struct ApprovalPolicy;

impl ApprovalPolicy {
    /// Route a validated assessment
    pub fn route(assessment: &RiskAssessment) -> RoutingDecision {
        Self::route_level(assessment.level)
    }

    /// The routing table
    pub const fn route_level(level: RiskLevel) -> RoutingDecision {
        match level {
            RiskLevel::Low => RoutingDecision::AutoApprove,
            RiskLevel::Medium => RoutingDecision::AutoApprove,
            RiskLevel::High => RoutingDecision::RequireHuman,
            RiskLevel::Critical => RoutingDecision::RequireHuman,
        }
    }

    /// Every (level, route) pair, lowest level first
    pub fn table() -> Vec<(RiskLevel, RoutingDecision)> {
        RiskLevel::iter()
            .map(|level| (level, Self::route_level(level)))
            .collect()
    }
}

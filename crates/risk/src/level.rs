//! Risk levels - ordered from lowest to highest

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::RiskError;

/// Fraud likelihood classification.
///
/// Ordering: `Low < Medium < High < Critical`. Serialized lowercase on the
/// wire (`"high"`), displayed uppercase in reports (`HIGH`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum RiskLevel {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl RiskLevel {
    /// Parse a scorer-supplied level, failing on anything outside the four values
    pub fn parse(raw: &str) -> Result<Self, RiskError> {
        <RiskLevel as FromStr>::from_str(raw.trim())
            .map_err(|_| RiskError::InvalidRiskLevel(raw.to_string()))
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

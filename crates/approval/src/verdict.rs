//! Reviewer verdicts and responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;

use crate::error::ApprovalError;

/// What the reviewer decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Verdict {
    Approve,
    Deny,
    /// Defer: hold the transaction for investigation
    Investigate,
}

impl FromStr for Verdict {
    type Err = ApprovalError;

    /// Accepts the console forms (`yes`/`no`/`investigate`) as well as the
    /// verdict names. Anything else is rejected, never guessed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" | "yes" | "y" => Ok(Verdict::Approve),
            "deny" | "denied" | "reject" | "no" | "n" => Ok(Verdict::Deny),
            "investigate" => Ok(Verdict::Investigate),
            _ => Err(ApprovalError::InvalidVerdict(s.to_string())),
        }
    }
}

/// Response as it comes back from the transport, unvalidated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    pub verdict: String,
    pub responder: String,
    /// When the reviewer answered; stamped by the caller if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

impl RawResponse {
    pub fn new(verdict: impl Into<String>, responder: impl Into<String>) -> Self {
        Self {
            verdict: verdict.into(),
            responder: responder.into(),
            responded_at: None,
        }
    }

    pub fn at(mut self, responded_at: DateTime<Utc>) -> Self {
        self.responded_at = Some(responded_at);
        self
    }

    /// Validate into a [`HumanResponse`], using `now` when the transport
    /// did not stamp the response
    pub fn validate(self, now: DateTime<Utc>) -> Result<HumanResponse, ApprovalError> {
        let verdict = self.verdict.parse::<Verdict>()?;
        Ok(HumanResponse {
            verdict,
            responder: self.responder,
            responded_at: self.responded_at.unwrap_or(now),
        })
    }
}

/// A validated reviewer response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanResponse {
    pub verdict: Verdict,
    pub responder: String,
    pub responded_at: DateTime<Utc>,
}

//! Review state machine for a single transaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApprovalError;
use crate::verdict::{HumanResponse, RawResponse, Verdict};

/// State of a human review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewState {
    /// Waiting for a valid verdict (initial)
    PendingReview,
    /// Reviewer approved
    Approved { responder: String, at: DateTime<Utc> },
    /// Reviewer denied
    Denied { responder: String, at: DateTime<Utc> },
    /// Deferred for investigation; may be reviewed again later
    PendingInvestigation { responder: String, at: DateTime<Utc> },
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::PendingReview => "pending_review",
            ReviewState::Approved { .. } => "approved",
            ReviewState::Denied { .. } => "denied",
            ReviewState::PendingInvestigation { .. } => "pending_investigation",
        }
    }

    /// Approved or denied; nothing more will happen to this review
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewState::Approved { .. } | ReviewState::Denied { .. })
    }

    /// Any state other than PendingReview
    pub fn is_settled(&self) -> bool {
        !matches!(self, ReviewState::PendingReview)
    }
}

/// One review of one transaction.
///
/// Only moves out of `PendingReview` on a valid verdict. Invalid answers
/// are counted and leave the state untouched.
#[derive(Debug, Clone)]
pub struct Review {
    transaction_id: String,
    state: ReviewState,
    invalid_responses: u32,
}

impl Review {
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            state: ReviewState::PendingReview,
            invalid_responses: 0,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn invalid_responses(&self) -> u32 {
        self.invalid_responses
    }

    /// Validate and apply a raw transport response
    pub fn submit(&mut self, raw: RawResponse, now: DateTime<Utc>) -> Result<&ReviewState, ApprovalError> {
        if self.state.is_settled() {
            return Err(ApprovalError::AlreadyResolved(self.transaction_id.clone()));
        }

        match raw.validate(now) {
            Ok(response) => self.apply(response),
            Err(e) => {
                self.invalid_responses += 1;
                Err(e)
            }
        }
    }

    /// Apply a validated response
    pub fn apply(&mut self, response: HumanResponse) -> Result<&ReviewState, ApprovalError> {
        if self.state.is_settled() {
            return Err(ApprovalError::AlreadyResolved(self.transaction_id.clone()));
        }

        let HumanResponse {
            verdict,
            responder,
            responded_at: at,
        } = response;

        self.state = match verdict {
            Verdict::Approve => ReviewState::Approved { responder, at },
            Verdict::Deny => ReviewState::Denied { responder, at },
            Verdict::Investigate => ReviewState::PendingInvestigation { responder, at },
        };

        Ok(&self.state)
    }

    /// Put the review on hold without a verdict (cancellation, unreachable
    /// reviewer). Settled reviews are left as they are.
    pub fn hold(&mut self, by: impl Into<String>, at: DateTime<Utc>) -> &ReviewState {
        if !self.state.is_settled() {
            self.state = ReviewState::PendingInvestigation {
                responder: by.into(),
                at,
            };
        }
        &self.state
    }

    pub fn into_state(self) -> ReviewState {
        self.state
    }
}

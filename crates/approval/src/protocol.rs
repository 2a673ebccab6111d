//! Confirmation protocol - drives one review through the gateway

use std::sync::Arc;
use txguard_core::Clock;

use crate::error::ApprovalError;
use crate::gateway::{ConfirmationGateway, ConfirmationRequest};
use crate::review::{Review, ReviewState};

/// Identity recorded when a transaction is held without a reviewer verdict
pub const HOLD_IDENTITY: &str = "Review Hold System";

/// Final state of one protocol run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub state: ReviewState,
    /// Why the review was held without a verdict
    pub note: Option<String>,
    /// Number of times the gateway was asked
    pub attempts: u32,
    pub invalid_responses: u32,
}

/// Runs the review state machine against a gateway.
///
/// Invalid verdicts are re-prompted up to `max_reprompts` times. When
/// re-prompts run out, or the gateway fails, the review is held for
/// investigation. The protocol never produces an approval on its own.
pub struct ConfirmationProtocol {
    gateway: Arc<dyn ConfirmationGateway>,
    max_reprompts: u32,
}

impl ConfirmationProtocol {
    pub fn new(gateway: Arc<dyn ConfirmationGateway>, max_reprompts: u32) -> Self {
        Self {
            gateway,
            max_reprompts,
        }
    }

    pub async fn run(&self, request: ConfirmationRequest, clock: &dyn Clock) -> ReviewResult {
        let mut review = Review::new(request.transaction.id.clone());
        let mut request = request;
        let mut attempts = 0;

        loop {
            attempts += 1;
            tracing::debug!(
                transaction_id = %request.transaction.id,
                gateway = self.gateway.name(),
                attempt = request.attempt,
                "Requesting human confirmation"
            );

            let raw = match self.gateway.confirm(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(
                        transaction_id = %request.transaction.id,
                        gateway = self.gateway.name(),
                        error = %e,
                        "Reviewer unreachable, holding transaction"
                    );
                    review.hold(HOLD_IDENTITY, clock.now());
                    return Self::finish(review, Some(format!("Reviewer unreachable: {}", e)), attempts);
                }
            };

            match review.submit(raw, clock.now()) {
                Ok(state) => {
                    tracing::info!(
                        transaction_id = %request.transaction.id,
                        state = state.as_str(),
                        attempts,
                        "Review completed"
                    );
                    return Self::finish(review, None, attempts);
                }
                Err(ApprovalError::InvalidVerdict(verdict)) => {
                    tracing::warn!(
                        transaction_id = %request.transaction.id,
                        verdict = %verdict,
                        invalid_responses = review.invalid_responses(),
                        "Invalid verdict"
                    );

                    if review.invalid_responses() > self.max_reprompts {
                        review.hold(HOLD_IDENTITY, clock.now());
                        let note = format!(
                            "No valid verdict after {} attempts; last answer {:?}",
                            attempts, verdict
                        );
                        return Self::finish(review, Some(note), attempts);
                    }

                    let error = ApprovalError::InvalidVerdict(verdict);
                    request = request.reprompt(error.to_string());
                }
                Err(e) => {
                    review.hold(HOLD_IDENTITY, clock.now());
                    return Self::finish(review, Some(e.to_string()), attempts);
                }
            }
        }
    }

    fn finish(review: Review, note: Option<String>, attempts: u32) -> ReviewResult {
        let invalid_responses = review.invalid_responses();
        ReviewResult {
            state: review.into_state(),
            note,
            attempts,
            invalid_responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedGateway;
    use crate::verdict::RawResponse;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use txguard_core::{Amount, Currency, FixedClock, Transaction, TransactionType};
    use txguard_risk::{RiskAssessment, RiskLevel};

    fn request() -> ConfirmationRequest {
        let tx = Transaction::new(
            "TRX-002",
            "ACC-12345",
            TransactionType::Wire,
            Amount::new(dec!(25000)).unwrap(),
            Currency::Usd,
            "Acme Corp",
            Utc::now(),
        );
        let assessment = RiskAssessment {
            level: RiskLevel::High,
            factors: vec!["First-time recipient".to_string()],
            rationale: String::new(),
            fail_closed: false,
        };
        ConfirmationRequest::new(tx, &assessment, "Security Analyst Smith")
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc::now())
    }

    #[tokio::test]
    async fn test_approve_first_try() {
        let gateway = Arc::new(
            ScriptedGateway::new().respond("TRX-002", RawResponse::new("approve", "Smith")),
        );
        let protocol = ConfirmationProtocol::new(gateway.clone(), 3);

        let result = protocol.run(request(), &clock()).await;

        assert_eq!(result.state.as_str(), "approved");
        assert_eq!(result.attempts, 1);
        assert!(result.note.is_none());
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_verdict_reprompts() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .respond("TRX-002", RawResponse::new("maybe", "Smith"))
                .respond("TRX-002", RawResponse::new("approve", "Smith")),
        );
        let protocol = ConfirmationProtocol::new(gateway.clone(), 3);

        let result = protocol.run(request(), &clock()).await;

        assert_eq!(result.state.as_str(), "approved");
        assert_eq!(result.attempts, 2);
        assert_eq!(result.invalid_responses, 1);

        let calls = gateway.calls();
        assert_eq!(calls[1].attempt, 2);
        assert!(calls[1].previous_error.is_some());
    }

    #[tokio::test]
    async fn test_reprompts_exhausted_holds() {
        let mut script = ScriptedGateway::new();
        for _ in 0..3 {
            script = script.respond("TRX-002", RawResponse::new("dunno", "Smith"));
        }
        let protocol = ConfirmationProtocol::new(Arc::new(script), 2);

        let result = protocol.run(request(), &clock()).await;

        match &result.state {
            ReviewState::PendingInvestigation { responder, .. } => {
                assert_eq!(responder, HOLD_IDENTITY)
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(result.attempts, 3);
        assert!(result.note.unwrap().contains("No valid verdict"));
    }

    #[tokio::test]
    async fn test_gateway_failure_holds() {
        let protocol = ConfirmationProtocol::new(Arc::new(ScriptedGateway::new()), 3);

        let result = protocol.run(request(), &clock()).await;

        assert_eq!(result.state.as_str(), "pending_investigation");
        assert!(result.note.unwrap().starts_with("Reviewer unreachable"));
    }

    #[tokio::test]
    async fn test_investigate_is_held_by_reviewer() {
        let gateway = Arc::new(
            ScriptedGateway::new().respond("TRX-002", RawResponse::new("investigate", "Smith")),
        );
        let protocol = ConfirmationProtocol::new(gateway, 3);

        let result = protocol.run(request(), &clock()).await;

        match result.state {
            ReviewState::PendingInvestigation { responder, .. } => assert_eq!(responder, "Smith"),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(result.note.is_none());
    }
}

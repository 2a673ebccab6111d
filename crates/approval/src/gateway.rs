//! Confirmation gateway - interface to the human reviewer

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use txguard_core::Transaction;
use txguard_risk::{RiskAssessment, RiskLevel};

use crate::error::GatewayError;
use crate::verdict::RawResponse;

/// What the reviewer is asked to decide on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub transaction: Transaction,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub rationale: String,
    /// Reviewer the request is addressed to
    pub reviewer: String,
    /// 1 on the first prompt, incremented on every re-prompt
    pub attempt: u32,
    /// Why the previous answer was rejected, on re-prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_error: Option<String>,
}

impl ConfirmationRequest {
    pub fn new(transaction: Transaction, assessment: &RiskAssessment, reviewer: impl Into<String>) -> Self {
        Self {
            transaction,
            risk_level: assessment.level,
            risk_factors: assessment.factors.clone(),
            rationale: assessment.rationale.clone(),
            reviewer: reviewer.into(),
            attempt: 1,
            previous_error: None,
        }
    }

    /// The same request, asked again after a rejected answer
    pub fn reprompt(&self, error: impl Into<String>) -> Self {
        Self {
            attempt: self.attempt + 1,
            previous_error: Some(error.into()),
            ..self.clone()
        }
    }

    /// Security alert text shown to the reviewer
    pub fn render_alert(&self) -> String {
        let tx = &self.transaction;
        let factors = if self.risk_factors.is_empty() {
            "None identified".to_string()
        } else {
            self.risk_factors.join(", ")
        };

        let mut alert = format!(
            "TRANSACTION SECURITY ALERT\n\n\
             Transaction ID: {}\n\
             Type: {}\n\
             Amount: {} {}\n\
             Recipient: {}\n\n\
             RISK ASSESSMENT: {}\n\n\
             RISK FACTORS:\n{}\n\n\
             THIS TRANSACTION HAS BEEN AUTOMATICALLY PAUSED DUE TO ITS {} RISK LEVEL.\n",
            tx.id, tx.kind, tx.amount, tx.currency, tx.recipient, self.risk_level, factors, self.risk_level,
        );

        if let Some(ref error) = self.previous_error {
            alert.push_str(&format!("\nPrevious answer rejected: {}\n", error));
        }

        alert.push_str(&format!(
            "\n{}, do you authorize this transaction to proceed? (yes/no/investigate):",
            self.reviewer
        ));
        alert
    }
}

/// Human confirmation transport.
///
/// `confirm` may take as long as the reviewer takes. It is awaited
/// cooperatively so other transactions keep moving.
#[async_trait]
pub trait ConfirmationGateway: Send + Sync {
    /// Gateway name for logging
    fn name(&self) -> &str;

    /// Present the request to a human and return the answer as given
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<RawResponse, GatewayError>;
}

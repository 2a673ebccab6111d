//! Outcome records - one per processing attempt

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use txguard_core::{Amount, Currency, Transaction, TransactionType};
use txguard_risk::{RiskAssessment, RiskLevel};

/// Identity recorded for policy-driven approvals
pub const AUTO_APPROVER: &str = "Auto-approval System";

/// Final status of a processing attempt
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Approved,
    Denied,
    /// Held; awaiting `resolve`
    PendingInvestigation,
    /// Never reached a decision (missing account, scorer contract violation)
    Error,
}

impl OutcomeStatus {
    /// A decision was made and nothing further is expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutcomeStatus::Approved | OutcomeStatus::Denied)
    }
}

/// Audit record for one processing attempt.
///
/// `sequence`, `prev_hash` and `hash` are assigned by the ledger when the
/// record is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub sequence: u64,
    pub transaction_id: String,
    pub account_id: String,
    pub transaction_type: TransactionType,
    pub amount: Amount,
    pub currency: Currency,
    /// Absent when processing failed before scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub decided_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub prev_hash: String,
    #[serde(default)]
    pub hash: String,
}

impl Outcome {
    pub fn new(transaction: &Transaction, status: OutcomeStatus, decided_at: DateTime<Utc>) -> Self {
        Self {
            sequence: 0,
            transaction_id: transaction.id.clone(),
            account_id: transaction.account_id.clone(),
            transaction_type: transaction.kind,
            amount: transaction.amount,
            currency: transaction.currency.clone(),
            risk_level: None,
            risk_factors: Vec::new(),
            status,
            approved_by: None,
            decided_at,
            note: None,
            prev_hash: String::new(),
            hash: String::new(),
        }
    }

    /// Approved by policy, without human involvement
    pub fn auto_approved(
        transaction: &Transaction,
        assessment: &RiskAssessment,
        decided_at: DateTime<Utc>,
    ) -> Self {
        Self::new(transaction, OutcomeStatus::Approved, decided_at)
            .with_assessment(assessment)
            .approved_by(AUTO_APPROVER)
    }

    /// Processing failed; never counted as approved or denied
    pub fn error(transaction: &Transaction, note: impl Into<String>, decided_at: DateTime<Utc>) -> Self {
        Self::new(transaction, OutcomeStatus::Error, decided_at).with_note(note)
    }

    pub fn with_assessment(mut self, assessment: &RiskAssessment) -> Self {
        self.risk_level = Some(assessment.level);
        self.risk_factors = assessment.factors.clone();
        self
    }

    pub fn approved_by(mut self, identity: impl Into<String>) -> Self {
        self.approved_by = Some(identity.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx() -> Transaction {
        Transaction::new(
            "TRX-001",
            "ACC-12345",
            TransactionType::Transfer,
            Amount::new(dec!(1200)).unwrap(),
            Currency::Usd,
            "Jane Smith",
            Utc::now(),
        )
    }

    #[test]
    fn test_auto_approved() {
        let assessment = RiskAssessment {
            level: RiskLevel::Low,
            factors: vec![],
            rationale: "Known recipient".to_string(),
            fail_closed: false,
        };
        let outcome = Outcome::auto_approved(&tx(), &assessment, Utc::now());

        assert_eq!(outcome.status, OutcomeStatus::Approved);
        assert_eq!(outcome.approved_by.as_deref(), Some(AUTO_APPROVER));
        assert_eq!(outcome.risk_level, Some(RiskLevel::Low));
    }

    #[test]
    fn test_error_outcome_has_no_approver() {
        let outcome = Outcome::error(&tx(), "Account not found: ACC-12345", Utc::now());

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert!(outcome.approved_by.is_none());
        assert!(outcome.risk_level.is_none());
        assert!(!outcome.status.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::PendingInvestigation).unwrap(),
            "\"PENDING_INVESTIGATION\""
        );
        assert_eq!(OutcomeStatus::Denied.to_string(), "DENIED");
        assert_eq!(
            "ERROR".parse::<OutcomeStatus>().unwrap(),
            OutcomeStatus::Error
        );
    }

    #[test]
    fn test_status_ordering() {
        assert!(OutcomeStatus::Approved < OutcomeStatus::Denied);
        assert!(OutcomeStatus::PendingInvestigation < OutcomeStatus::Error);
    }
}

//! Processor errors

use thiserror::Error;
use txguard_approval::ApprovalError;
use txguard_audit::AuditError;
use txguard_risk::RiskError;

/// Errors from the transaction processor.
///
/// Per-transaction failures (missing account, scorer contract violations)
/// become ERROR outcomes and never surface here as long as the audit trail
/// accepts them.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Risk scorer contract violation: {0}")]
    Risk(#[from] RiskError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error("Audit trail unavailable: {0}")]
    Audit(#[from] AuditError),

    #[error("Processing task failed: {0}")]
    Task(String),
}

/// Result type for processor operations
pub type ProcessResult<T> = Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;
    use txguard_risk::RiskLevel;

    #[test]
    fn test_account_not_found_message() {
        let err = ProcessError::AccountNotFound("ACC-404".to_string());
        assert_eq!(err.to_string(), "Account not found: ACC-404");
    }

    #[test]
    fn test_contract_violation_message() {
        let err = ProcessError::from(RiskError::MissingRiskFactors(RiskLevel::High));
        assert!(err.to_string().starts_with("Risk scorer contract violation"));
    }

    #[test]
    fn test_no_active_hold_is_transparent() {
        let err = ProcessError::from(ApprovalError::NoActiveHold("TRX-009".to_string()));
        assert_eq!(err.to_string(), "No active investigation hold for TRX-009");
    }
}

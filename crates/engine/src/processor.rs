//! Transaction Processor - Orchestrates the review pipeline
//!
//! ```text
//! Transaction
//!      │
//!      ▼
//! ┌─────────────────┐
//! │ Account lookup  │──► missing? ERROR outcome
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Risk scoring    │──► timeout/failure? CRITICAL (fail-closed)
//! │ (bounded)       │──► contract violation? ERROR outcome
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ ApprovalPolicy  │──► LOW/MEDIUM: APPROVED by Auto-approval System
//! └────────┬────────┘
//!          │ HIGH/CRITICAL
//!          ▼
//! ┌─────────────────┐
//! │ Human review    │──► APPROVED / DENIED / PENDING_INVESTIGATION
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Audit ledger    │──► every attempt appended
//! └─────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use txguard_approval::{
    ApprovalError, ConfirmationGateway, ConfirmationProtocol, ConfirmationRequest, HoldRegistry,
    HoldUpdate, InvestigationHold, ReviewResult, ReviewState, HOLD_IDENTITY,
};
use txguard_audit::{AuditLedger, Outcome, OutcomeStatus};
use txguard_core::{AccountProfile, Clock, SystemClock, Transaction};
use txguard_risk::{
    ApprovalPolicy, RiskAssessment, RiskError, RiskScorer, RoutingDecision, ScoringError,
};

use crate::config::GuardConfig;
use crate::directory::AccountDirectory;
use crate::error::{ProcessError, ProcessResult};

const CANCELLED_NOTE: &str = "Review cancelled";
const NOT_STARTED_NOTE: &str = "Run cancelled before processing";

/// Processes transactions end to end.
///
/// Cheap to clone: every clone shares the same ledger, hold registry and
/// collaborators.
#[derive(Clone)]
pub struct TransactionProcessor {
    config: Arc<GuardConfig>,
    directory: Arc<dyn AccountDirectory>,
    scorer: Arc<dyn RiskScorer>,
    protocol: Arc<ConfirmationProtocol>,
    ledger: Arc<AuditLedger>,
    holds: Arc<HoldRegistry>,
    clock: Arc<dyn Clock>,
}

impl TransactionProcessor {
    pub fn new(
        config: GuardConfig,
        directory: Arc<dyn AccountDirectory>,
        scorer: Arc<dyn RiskScorer>,
        gateway: Arc<dyn ConfirmationGateway>,
        ledger: Arc<AuditLedger>,
    ) -> Self {
        let protocol = ConfirmationProtocol::new(gateway, config.max_reprompts);
        Self {
            config: Arc::new(config),
            directory,
            scorer,
            protocol: Arc::new(protocol),
            ledger,
            holds: Arc::new(HoldRegistry::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use another time source for decision timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<AuditLedger> {
        &self.ledger
    }

    /// Process one transaction and append its outcome to the audit trail.
    ///
    /// Only fails when the outcome could not be recorded.
    pub async fn process(&self, transaction: &Transaction) -> ProcessResult<Outcome> {
        let outcome = self.decide(transaction, None).await;
        self.record(outcome).await
    }

    /// Process a batch. Results come back in input order; a failed
    /// transaction never stops the rest.
    pub async fn process_batch(&self, transactions: &[Transaction]) -> ProcessResult<Vec<Outcome>> {
        self.run_batch(transactions, None).await
    }

    /// Process a batch until `cancel` turns true.
    ///
    /// A review still waiting for a verdict at that point is held as
    /// PENDING_INVESTIGATION, as is every transaction not yet started.
    pub async fn process_batch_until(
        &self,
        transactions: &[Transaction],
        cancel: watch::Receiver<bool>,
    ) -> ProcessResult<Vec<Outcome>> {
        self.run_batch(transactions, Some(cancel)).await
    }

    /// Ask for a verdict again on a held transaction. Appends a new outcome.
    pub async fn resolve(&self, transaction_id: &str) -> ProcessResult<Outcome> {
        let hold = self
            .holds
            .get(transaction_id)
            .await
            .ok_or_else(|| ApprovalError::NoActiveHold(transaction_id.to_string()))?;

        tracing::info!(
            transaction_id,
            reaffirmations = hold.reaffirmations,
            "Resolving investigation hold"
        );

        let outcome = match hold.assessment {
            Some(ref assessment) => self.review(&hold.transaction, assessment, None).await,
            // Held before scoring: run the whole pipeline
            None => self.decide(&hold.transaction, None).await,
        };
        self.record(outcome).await
    }

    /// Active investigation holds, ordered by transaction id
    pub async fn open_holds(&self) -> Vec<InvestigationHold> {
        self.holds.active().await
    }

    /// Rebuild holds from the audit trail after a restart.
    ///
    /// A transaction is held again when its latest record is
    /// PENDING_INVESTIGATION. Returns the number of holds restored.
    pub async fn restore_holds(&self, transactions: &[Transaction]) -> usize {
        let mut restored = 0;

        for transaction in transactions {
            let Some(latest) = self.ledger.latest(&transaction.id).await else {
                continue;
            };
            if latest.status != OutcomeStatus::PendingInvestigation {
                continue;
            }

            let assessment = latest.risk_level.map(|level| RiskAssessment {
                level,
                factors: latest.risk_factors.clone(),
                rationale: String::new(),
                fail_closed: false,
            });
            self.holds
                .restore(InvestigationHold {
                    transaction: transaction.clone(),
                    assessment,
                    held_by: latest
                        .approved_by
                        .clone()
                        .unwrap_or_else(|| HOLD_IDENTITY.to_string()),
                    reason: latest.note.clone().unwrap_or_default(),
                    opened_at: latest.decided_at,
                    reaffirmations: 0,
                    last_reaffirmed_at: None,
                })
                .await;
            restored += 1;
        }

        if restored > 0 {
            tracing::info!(restored, "Investigation holds restored from audit trail");
        }
        restored
    }

    async fn run_batch(
        &self,
        transactions: &[Transaction],
        cancel: Option<watch::Receiver<bool>>,
    ) -> ProcessResult<Vec<Outcome>> {
        tracing::info!(
            count = transactions.len(),
            concurrency = self.config.concurrency(),
            "Processing batch"
        );

        if self.config.concurrency() == 1 {
            let mut outcomes = Vec::with_capacity(transactions.len());
            for transaction in transactions {
                let outcome = self.decide(transaction, cancel.clone()).await;
                outcomes.push(self.record(outcome).await?);
            }
            return Ok(outcomes);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let mut handles = Vec::with_capacity(transactions.len());

        for transaction in transactions {
            let processor = self.clone();
            let transaction = transaction.clone();
            let cancel = cancel.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ProcessError::Task(e.to_string()))?;
                let outcome = processor.decide(&transaction, cancel).await;
                processor.record(outcome).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|e| ProcessError::Task(e.to_string()))??;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Decide the outcome of one attempt without recording it.
    ///
    /// An attempt that does not end PENDING_INVESTIGATION closes any hold
    /// left by an earlier attempt, so the registry always agrees with the
    /// latest record.
    async fn decide(&self, transaction: &Transaction, cancel: Option<watch::Receiver<bool>>) -> Outcome {
        let outcome = self.evaluate(transaction, cancel).await;
        if outcome.status != OutcomeStatus::PendingInvestigation {
            self.holds.release(&transaction.id).await;
        }
        outcome
    }

    async fn evaluate(&self, transaction: &Transaction, cancel: Option<watch::Receiver<bool>>) -> Outcome {
        if cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return self.hold_unstarted(transaction).await;
        }

        tracing::info!(
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            currency = %transaction.currency,
            "Processing transaction"
        );

        let Some(profile) = self.directory.profile(&transaction.account_id).await else {
            let err = ProcessError::AccountNotFound(transaction.account_id.clone());
            tracing::warn!(transaction_id = %transaction.id, error = %err, "Cannot score transaction");
            return Outcome::error(transaction, err.to_string(), self.clock.now());
        };

        let assessment = match self.assess(transaction, &profile).await {
            Ok(assessment) => assessment,
            Err(e) => {
                let err = ProcessError::from(e);
                tracing::error!(transaction_id = %transaction.id, error = %err, "Rejected risk assessment");
                return Outcome::error(transaction, err.to_string(), self.clock.now());
            }
        };

        let decision = ApprovalPolicy::route(&assessment);
        tracing::info!(
            transaction_id = %transaction.id,
            risk = %assessment.level,
            factors = assessment.factors.len(),
            decision = %decision,
            "Transaction routed"
        );

        match decision {
            RoutingDecision::AutoApprove => {
                Outcome::auto_approved(transaction, &assessment, self.clock.now())
            }
            RoutingDecision::RequireHuman => self.review(transaction, &assessment, cancel).await,
        }
    }

    /// Score under the timeout. Scorer failures escalate to CRITICAL;
    /// malformed assessments are returned as errors.
    async fn assess(
        &self,
        transaction: &Transaction,
        profile: &AccountProfile,
    ) -> Result<RiskAssessment, RiskError> {
        let scored = tokio::time::timeout(
            self.config.scoring_timeout(),
            self.scorer.assess(transaction, profile),
        )
        .await;

        let failure = match scored {
            Ok(Ok(raw)) => return RiskAssessment::from_raw(raw),
            Ok(Err(e)) => e,
            Err(_) => ScoringError::Timeout(self.config.scoring_timeout_ms),
        };

        tracing::warn!(
            transaction_id = %transaction.id,
            scorer = self.scorer.name(),
            error = %failure,
            "Risk scoring unavailable, escalating to CRITICAL"
        );
        Ok(RiskAssessment::fail_closed(&failure))
    }

    async fn review(
        &self,
        transaction: &Transaction,
        assessment: &RiskAssessment,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Outcome {
        let request = ConfirmationRequest::new(
            transaction.clone(),
            assessment,
            self.config.reviewer_name.clone(),
        );

        let result = match cancel {
            Some(mut cancel) => {
                tokio::select! {
                    result = self.protocol.run(request, self.clock.as_ref()) => result,
                    _ = cancelled(&mut cancel) => {
                        tracing::warn!(transaction_id = %transaction.id, "Review cancelled while waiting for a verdict");
                        ReviewResult {
                            state: ReviewState::PendingInvestigation {
                                responder: HOLD_IDENTITY.to_string(),
                                at: self.clock.now(),
                            },
                            note: Some(CANCELLED_NOTE.to_string()),
                            attempts: 0,
                            invalid_responses: 0,
                        }
                    }
                }
            }
            None => self.protocol.run(request, self.clock.as_ref()).await,
        };

        self.outcome_from_review(transaction, assessment, result).await
    }

    async fn outcome_from_review(
        &self,
        transaction: &Transaction,
        assessment: &RiskAssessment,
        result: ReviewResult,
    ) -> Outcome {
        let ReviewResult { state, note, .. } = result;

        let (status, responder, at) = match state {
            ReviewState::Approved { responder, at } => (OutcomeStatus::Approved, responder, at),
            ReviewState::Denied { responder, at } => (OutcomeStatus::Denied, responder, at),
            ReviewState::PendingInvestigation { responder, at } => {
                (OutcomeStatus::PendingInvestigation, responder, at)
            }
            ReviewState::PendingReview => (
                OutcomeStatus::PendingInvestigation,
                HOLD_IDENTITY.to_string(),
                self.clock.now(),
            ),
        };

        let mut outcome = Outcome::new(transaction, status, at)
            .with_assessment(assessment)
            .approved_by(responder.clone());

        if status.is_terminal() {
            self.holds.release(&transaction.id).await;
            return outcome;
        }

        let reason = note.unwrap_or_else(|| format!("Held for investigation by {}", responder));
        let update = self
            .holds
            .hold(transaction, Some(assessment), &responder, &reason, at)
            .await;

        outcome = match update {
            HoldUpdate::Opened => outcome.with_note(reason),
            HoldUpdate::Reaffirmed => outcome.with_note(format!("Investigation hold re-affirmed: {}", reason)),
        };
        outcome
    }

    async fn hold_unstarted(&self, transaction: &Transaction) -> Outcome {
        let now = self.clock.now();
        tracing::warn!(transaction_id = %transaction.id, "Run cancelled, holding unprocessed transaction");

        self.holds
            .hold(transaction, None, HOLD_IDENTITY, NOT_STARTED_NOTE, now)
            .await;

        Outcome::new(transaction, OutcomeStatus::PendingInvestigation, now)
            .approved_by(HOLD_IDENTITY)
            .with_note(NOT_STARTED_NOTE)
    }

    async fn record(&self, outcome: Outcome) -> ProcessResult<Outcome> {
        self.ledger.record(outcome).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to record outcome");
            ProcessError::from(e)
        })
    }
}

/// Resolves once the flag is true. Never resolves if the sender goes away
/// without cancelling.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use txguard_approval::{RawResponse, ScriptedGateway};
    use txguard_audit::AUTO_APPROVER;
    use txguard_core::{Amount, Currency, FixedClock, TransactionType};
    use txguard_risk::{PresetScorer, RawAssessment, RiskLevel};

    fn profile() -> AccountProfile {
        AccountProfile {
            account_id: "ACC-12345".to_string(),
            customer_name: "John Doe".to_string(),
            account_type: "Checking".to_string(),
            balance: dec!(15000),
            currency: Currency::Usd,
            daily_limit: dec!(10000),
            country: "United States".to_string(),
            usual_countries: vec!["United States".to_string()],
            usual_transaction_amounts: vec![dec!(1200)],
            usual_recipients: vec!["Jane Smith".to_string()],
            transaction_history_summary: String::new(),
        }
    }

    fn tx(id: &str, amount: rust_decimal::Decimal) -> Transaction {
        Transaction::new(
            id,
            "ACC-12345",
            TransactionType::Wire,
            Amount::new(amount).unwrap(),
            Currency::Usd,
            "Acme Corp",
            Utc.with_ymd_and_hms(2025, 3, 15, 14, 30, 0).unwrap(),
        )
    }

    /// Hands out its assessments in order, one per call
    struct SequenceScorer(std::sync::Mutex<Vec<RawAssessment>>);

    impl SequenceScorer {
        fn new(mut assessments: Vec<RawAssessment>) -> Self {
            assessments.reverse();
            Self(std::sync::Mutex::new(assessments))
        }
    }

    #[async_trait::async_trait]
    impl RiskScorer for SequenceScorer {
        fn name(&self) -> &str {
            "SequenceScorer"
        }

        async fn assess(
            &self,
            _transaction: &Transaction,
            _profile: &AccountProfile,
        ) -> Result<RawAssessment, ScoringError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ScoringError::Unavailable("no assessment left".to_string()))
        }
    }

    fn processor(scorer: PresetScorer, gateway: Arc<ScriptedGateway>) -> TransactionProcessor {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 15, 15, 0, 0).unwrap());
        TransactionProcessor::new(
            GuardConfig::default(),
            Arc::new(InMemoryDirectory::from_profiles(vec![profile()])),
            Arc::new(scorer),
            gateway,
            Arc::new(AuditLedger::in_memory()),
        )
        .with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_medium_risk_auto_approved() {
        let gateway = Arc::new(ScriptedGateway::new());
        let scorer = PresetScorer::new().with(
            "TRX-010",
            RawAssessment::new("medium", vec!["Amount exceeds typical transaction".to_string()], ""),
        );
        let processor = processor(scorer, gateway.clone());

        let outcome = processor.process(&tx("TRX-010", dec!(3000))).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Approved);
        assert_eq!(outcome.approved_by.as_deref(), Some(AUTO_APPROVER));
        assert_eq!(outcome.risk_level, Some(RiskLevel::Medium));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_critical_risk_denied() {
        let gateway = Arc::new(
            ScriptedGateway::new().respond("TRX-011", RawResponse::new("deny", "Analyst")),
        );
        let scorer = PresetScorer::new().with(
            "TRX-011",
            RawAssessment::new("critical", vec!["Amount exceeds daily limit".to_string()], ""),
        );
        let processor = processor(scorer, gateway.clone());

        let outcome = processor.process(&tx("TRX-011", dec!(50000))).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Denied);
        assert_eq!(outcome.approved_by.as_deref(), Some("Analyst"));
        assert_eq!(gateway.call_count(), 1);
        assert!(processor.open_holds().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_risk_level_is_error_outcome() {
        let gateway = Arc::new(ScriptedGateway::new());
        let scorer = PresetScorer::new().with("TRX-012", RawAssessment::new("severe", vec![], ""));
        let processor = processor(scorer, gateway.clone());

        let outcome = processor.process(&tx("TRX-012", dec!(100))).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert!(outcome.note.unwrap().contains("Invalid risk level"));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_high_risk_without_factors_is_error_outcome() {
        let scorer = PresetScorer::new().with("TRX-013", RawAssessment::new("high", vec![], ""));
        let processor = processor(scorer, Arc::new(ScriptedGateway::new()));

        let outcome = processor.process(&tx("TRX-013", dec!(100))).await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Error);
        assert!(outcome.risk_level.is_none());
    }

    #[tokio::test]
    async fn test_resolve_without_hold() {
        let processor = processor(PresetScorer::new(), Arc::new(ScriptedGateway::new()));

        let result = processor.resolve("TRX-404").await;

        assert!(matches!(
            result,
            Err(ProcessError::Approval(ApprovalError::NoActiveHold(_)))
        ));
        assert!(processor.ledger().is_empty().await);
    }

    #[tokio::test]
    async fn test_second_investigate_reaffirms_hold() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .respond("TRX-014", RawResponse::new("investigate", "Analyst"))
                .respond("TRX-014", RawResponse::new("investigate", "Analyst")),
        );
        let scorer = PresetScorer::new().with(
            "TRX-014",
            RawAssessment::new("high", vec!["First-time recipient".to_string()], ""),
        );
        let processor = processor(scorer, gateway);

        processor.process(&tx("TRX-014", dec!(9000))).await.unwrap();
        let again = processor.resolve("TRX-014").await.unwrap();

        assert_eq!(again.status, OutcomeStatus::PendingInvestigation);
        assert!(again.note.unwrap().starts_with("Investigation hold re-affirmed"));

        let holds = processor.open_holds().await;
        assert_eq!(holds.len(), 1);
        assert_eq!(holds[0].reaffirmations, 1);
        assert_eq!(processor.ledger().len().await, 2);
    }

    #[tokio::test]
    async fn test_restore_holds_from_ledger() {
        let gateway = Arc::new(
            ScriptedGateway::new().respond("TRX-015", RawResponse::new("investigate", "Analyst")),
        );
        let scorer = PresetScorer::new().with(
            "TRX-015",
            RawAssessment::new("high", vec!["First-time recipient".to_string()], ""),
        );
        let first = processor(scorer.clone(), gateway);
        let transaction = tx("TRX-015", dec!(9000));
        first.process(&transaction).await.unwrap();

        let gateway = Arc::new(
            ScriptedGateway::new().respond("TRX-015", RawResponse::new("approve", "Analyst")),
        );
        let second = TransactionProcessor::new(
            GuardConfig::default(),
            Arc::new(InMemoryDirectory::from_profiles(vec![profile()])),
            Arc::new(scorer),
            gateway,
            first.ledger().clone(),
        );

        assert_eq!(second.restore_holds(&[transaction]).await, 1);
        let outcome = second.resolve("TRX-015").await.unwrap();

        assert_eq!(outcome.status, OutcomeStatus::Approved);
        assert_eq!(outcome.risk_level, Some(RiskLevel::High));
        assert!(second.open_holds().await.is_empty());
    }

    #[tokio::test]
    async fn test_reprocess_auto_approval_releases_hold() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .respond("TRX-016", RawResponse::new("investigate", "Analyst"))
                .respond("TRX-016", RawResponse::new("deny", "Analyst")),
        );
        let scorer = SequenceScorer::new(vec![
            RawAssessment::new("high", vec!["First-time recipient".to_string()], ""),
            RawAssessment::new("low", vec![], ""),
        ]);
        let processor = TransactionProcessor::new(
            GuardConfig::default(),
            Arc::new(InMemoryDirectory::from_profiles(vec![profile()])),
            Arc::new(scorer),
            gateway.clone(),
            Arc::new(AuditLedger::in_memory()),
        );
        let transaction = tx("TRX-016", dec!(9000));

        let first = processor.process(&transaction).await.unwrap();
        assert_eq!(first.status, OutcomeStatus::PendingInvestigation);
        assert_eq!(processor.open_holds().await.len(), 1);

        let second = processor.process(&transaction).await.unwrap();
        assert_eq!(second.status, OutcomeStatus::Approved);
        assert!(processor.open_holds().await.is_empty());
        assert!(processor.ledger().summarize().await.unwrap().open_items.is_empty());

        let result = processor.resolve("TRX-016").await;
        assert!(matches!(
            result,
            Err(ProcessError::Approval(ApprovalError::NoActiveHold(_)))
        ));
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(processor.ledger().len().await, 2);
    }

    #[tokio::test]
    async fn test_reprocess_error_releases_hold() {
        let gateway = Arc::new(
            ScriptedGateway::new().respond("TRX-017", RawResponse::new("investigate", "Analyst")),
        );
        let scorer = SequenceScorer::new(vec![
            RawAssessment::new("high", vec!["First-time recipient".to_string()], ""),
            RawAssessment::new("severe", vec![], ""),
        ]);
        let processor = TransactionProcessor::new(
            GuardConfig::default(),
            Arc::new(InMemoryDirectory::from_profiles(vec![profile()])),
            Arc::new(scorer),
            gateway,
            Arc::new(AuditLedger::in_memory()),
        );
        let transaction = tx("TRX-017", dec!(9000));

        processor.process(&transaction).await.unwrap();
        let second = processor.process(&transaction).await.unwrap();

        assert_eq!(second.status, OutcomeStatus::Error);
        assert!(processor.open_holds().await.is_empty());
    }
}

//! Investigation holds
//!
//! A transaction deferred with `investigate` (or left unresolved) is held
//! here until someone resolves it. At most one hold is active per
//! transaction: holding an already-held transaction re-affirms the
//! existing hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use txguard_core::Transaction;
use txguard_risk::RiskAssessment;

/// An active hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigationHold {
    pub transaction: Transaction,
    /// Absent when the transaction was held before it could be scored
    pub assessment: Option<RiskAssessment>,
    /// Who placed the hold (reviewer or the hold system)
    pub held_by: String,
    pub reason: String,
    pub opened_at: DateTime<Utc>,
    /// Number of later `investigate` verdicts on this same hold
    pub reaffirmations: u32,
    pub last_reaffirmed_at: Option<DateTime<Utc>>,
}

/// Result of placing a hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldUpdate {
    Opened,
    Reaffirmed,
}

/// Registry of active holds, keyed by transaction id
#[derive(Debug, Default)]
pub struct HoldRegistry {
    holds: Mutex<BTreeMap<String, InvestigationHold>>,
}

impl HoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a hold, or re-affirm the active one for the same transaction
    pub async fn hold(
        &self,
        transaction: &Transaction,
        assessment: Option<&RiskAssessment>,
        held_by: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> HoldUpdate {
        let mut holds = self.holds.lock().await;

        if let Some(existing) = holds.get_mut(&transaction.id) {
            existing.reaffirmations += 1;
            existing.last_reaffirmed_at = Some(at);
            tracing::info!(
                transaction_id = %transaction.id,
                reaffirmations = existing.reaffirmations,
                "Investigation hold re-affirmed"
            );
            return HoldUpdate::Reaffirmed;
        }

        holds.insert(
            transaction.id.clone(),
            InvestigationHold {
                transaction: transaction.clone(),
                assessment: assessment.cloned(),
                held_by: held_by.to_string(),
                reason: reason.to_string(),
                opened_at: at,
                reaffirmations: 0,
                last_reaffirmed_at: None,
            },
        );
        tracing::info!(transaction_id = %transaction.id, held_by, reason, "Investigation hold opened");
        HoldUpdate::Opened
    }

    /// The active hold for a transaction
    pub async fn get(&self, transaction_id: &str) -> Option<InvestigationHold> {
        self.holds.lock().await.get(transaction_id).cloned()
    }

    /// Release a hold once its transaction reached a terminal state
    pub async fn release(&self, transaction_id: &str) -> Option<InvestigationHold> {
        let released = self.holds.lock().await.remove(transaction_id);
        if released.is_some() {
            tracing::info!(transaction_id, "Investigation hold released");
        }
        released
    }

    /// Restore a hold recorded by an earlier run
    pub async fn restore(&self, hold: InvestigationHold) {
        self.holds
            .lock()
            .await
            .insert(hold.transaction.id.clone(), hold);
    }

    /// Active holds ordered by transaction id
    pub async fn active(&self) -> Vec<InvestigationHold> {
        self.holds.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.holds.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.holds.lock().await.is_empty()
    }
}

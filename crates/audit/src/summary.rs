//! Aggregates over the audit trail
//!
//! Ordered maps only, so that the JSON form of a summary is identical for
//! identical input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use strum::IntoEnumIterator;
use txguard_core::{Currency, TransactionType};
use txguard_risk::RiskLevel;

use crate::error::{AuditError, AuditResult};
use crate::outcome::{Outcome, OutcomeStatus};

/// One line of the transaction summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub sequence: u64,
    pub transaction_id: String,
    pub transaction_type: TransactionType,
    pub status: OutcomeStatus,
    pub amount: Decimal,
    pub currency: Currency,
    pub risk_level: Option<RiskLevel>,
    pub approved_by: Option<String>,
    pub decided_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl From<&Outcome> for SummaryRow {
    fn from(outcome: &Outcome) -> Self {
        Self {
            sequence: outcome.sequence,
            transaction_id: outcome.transaction_id.clone(),
            transaction_type: outcome.transaction_type,
            status: outcome.status,
            amount: outcome.amount.value(),
            currency: outcome.currency.clone(),
            risk_level: outcome.risk_level,
            approved_by: outcome.approved_by.clone(),
            decided_at: outcome.decided_at,
            note: outcome.note.clone(),
        }
    }
}

/// Summary of a run.
///
/// Counts and totals are per record, so a transaction held and later
/// approved contributes to both PENDING_INVESTIGATION and APPROVED.
/// `open_items` lists the transactions whose latest record is still held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub rows: Vec<SummaryRow>,
    pub counts: BTreeMap<OutcomeStatus, usize>,
    pub totals: BTreeMap<OutcomeStatus, BTreeMap<Currency, Decimal>>,
    pub open_items: Vec<String>,
}

impl AuditSummary {
    /// Fails only when a per-currency total overflows `Decimal`
    pub fn from_records(records: &[Outcome]) -> AuditResult<Self> {
        let mut counts: BTreeMap<OutcomeStatus, usize> =
            OutcomeStatus::iter().map(|status| (status, 0)).collect();
        let mut totals: BTreeMap<OutcomeStatus, BTreeMap<Currency, Decimal>> = BTreeMap::new();
        let mut latest: HashMap<&str, u64> = HashMap::new();

        for record in records {
            *counts.entry(record.status).or_insert(0) += 1;
            let total = totals
                .entry(record.status)
                .or_default()
                .entry(record.currency.clone())
                .or_insert(Decimal::ZERO);
            *total = total.checked_add(record.amount.value()).ok_or_else(|| {
                AuditError::TotalOverflow {
                    status: record.status.to_string(),
                    currency: record.currency.to_string(),
                }
            })?;
            latest.insert(record.transaction_id.as_str(), record.sequence);
        }

        let open_items = records
            .iter()
            .filter(|r| r.status == OutcomeStatus::PendingInvestigation)
            .filter(|r| latest.get(r.transaction_id.as_str()) == Some(&r.sequence))
            .map(|r| r.transaction_id.clone())
            .collect();

        Ok(Self {
            rows: records.iter().map(SummaryRow::from).collect(),
            counts,
            totals,
            open_items,
        })
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Total amount recorded under `status` in `currency`
    pub fn total(&self, status: OutcomeStatus, currency: &Currency) -> Decimal {
        self.totals
            .get(&status)
            .and_then(|by_currency| by_currency.get(currency))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

//! Preset scorer - replays assessments recorded ahead of time
//!
//! Used for demos and deterministic replays: each transaction id maps to
//! the raw assessment an upstream scorer produced for it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use txguard_core::{AccountProfile, Transaction};

use crate::assessment::RawAssessment;
use crate::error::ScoringError;
use crate::scorer::RiskScorer;

/// Scorer backed by a fixed table of assessments
#[derive(Debug, Clone, Default)]
pub struct PresetScorer {
    assessments: HashMap<String, RawAssessment>,
}

impl PresetScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the assessment for a transaction id
    pub fn with(mut self, transaction_id: impl Into<String>, raw: RawAssessment) -> Self {
        self.assessments.insert(transaction_id.into(), raw);
        self
    }

    /// Load from a JSON object keyed by transaction id
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let assessments: HashMap<String, RawAssessment> = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self { assessments })
    }

    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }
}

#[async_trait]
impl RiskScorer for PresetScorer {
    fn name(&self) -> &str {
        "PresetScorer"
    }

    async fn assess(
        &self,
        transaction: &Transaction,
        _profile: &AccountProfile,
    ) -> Result<RawAssessment, ScoringError> {
        self.assessments
            .get(&transaction.id)
            .cloned()
            .ok_or_else(|| {
                ScoringError::Unavailable(format!("no preset assessment for {}", transaction.id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use txguard_core::{Amount, Currency, TransactionType};

    fn tx(id: &str) -> Transaction {
        Transaction::new(
            id,
            "ACC-1",
            TransactionType::Payment,
            Amount::new(dec!(10)).unwrap(),
            Currency::Usd,
            "Shop",
            Utc::now(),
        )
    }

    fn profile() -> AccountProfile {
        AccountProfile {
            account_id: "ACC-1".to_string(),
            customer_name: "A".to_string(),
            account_type: "Checking".to_string(),
            balance: dec!(100),
            currency: Currency::Usd,
            daily_limit: dec!(100),
            country: "Canada".to_string(),
            usual_countries: vec![],
            usual_transaction_amounts: vec![],
            usual_recipients: vec![],
            transaction_history_summary: String::new(),
        }
    }

    #[tokio::test]
    async fn test_returns_preset_assessment() {
        let scorer = PresetScorer::new().with(
            "TRX-001",
            RawAssessment::new("low", vec![], "Normal"),
        );
        let raw = scorer.assess(&tx("TRX-001"), &profile()).await.unwrap();
        assert_eq!(raw.risk_level, "low");
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_unavailable() {
        let scorer = PresetScorer::new();
        let result = scorer.assess(&tx("TRX-404"), &profile()).await;
        assert!(matches!(result, Err(ScoringError::Unavailable(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"TRX-002": {{"risk_level": "high", "risk_factors": ["First-time recipient"], "risk_explanation": "x"}}}}"#
        )
        .unwrap();

        let scorer = PresetScorer::from_file(file.path()).unwrap();
        assert_eq!(scorer.len(), 1);
    }
}

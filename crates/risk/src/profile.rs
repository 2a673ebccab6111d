//! Profile scorer - deterministic rule-based scoring against account history
//!
//! Evaluates the signals a fraud analyst checks first:
//! 1. Amount relative to the account's daily limit
//! 2. Transaction location compared to the holder's usual countries
//! 3. Amount relative to usual behavior
//! 4. First-time recipients vs known recipients
//! 5. Time of transaction relative to normal patterns
//!
//! The number of signals that fire decides the risk level.

use async_trait::async_trait;
use chrono::Timelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use txguard_core::{AccountProfile, Transaction};

use crate::assessment::RawAssessment;
use crate::error::ScoringError;
use crate::level::RiskLevel;
use crate::scorer::RiskScorer;

pub const FACTOR_DAILY_LIMIT: &str = "Amount exceeds daily limit";
pub const FACTOR_COUNTRY: &str = "Unusual destination country";
pub const FACTOR_AMOUNT: &str = "Amount exceeds typical transaction";
pub const FACTOR_RECIPIENT: &str = "First-time recipient";
pub const FACTOR_TIME: &str = "Unusual time of day";

/// Thresholds for the profile scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileScorerConfig {
    /// Amount above `typical max * multiplier` counts as unusual
    #[serde(default = "default_amount_multiplier")]
    pub amount_multiplier: Decimal,

    /// First hour (UTC, inclusive) of the quiet window
    #[serde(default = "default_quiet_start_hour")]
    pub quiet_start_hour: u32,

    /// Last hour (UTC, exclusive) of the quiet window
    #[serde(default = "default_quiet_end_hour")]
    pub quiet_end_hour: u32,
}

fn default_amount_multiplier() -> Decimal {
    Decimal::new(3, 0)
}

fn default_quiet_start_hour() -> u32 {
    0
}

fn default_quiet_end_hour() -> u32 {
    5
}

impl Default for ProfileScorerConfig {
    fn default() -> Self {
        Self {
            amount_multiplier: default_amount_multiplier(),
            quiet_start_hour: default_quiet_start_hour(),
            quiet_end_hour: default_quiet_end_hour(),
        }
    }
}

/// Rule-based scorer over the sender's [`AccountProfile`]
#[derive(Debug, Clone, Default)]
pub struct ProfileScorer {
    config: ProfileScorerConfig,
}

impl ProfileScorer {
    pub fn new(config: ProfileScorerConfig) -> Self {
        Self { config }
    }

    /// Risk factors in order of significance
    pub fn factors(&self, tx: &Transaction, profile: &AccountProfile) -> Vec<String> {
        let mut factors = Vec::new();
        let amount = tx.amount.value();

        if amount > profile.daily_limit {
            factors.push(FACTOR_DAILY_LIMIT.to_string());
        }

        if let Some(country) = tx.origin_country() {
            if !profile.is_usual_country(country) {
                factors.push(FACTOR_COUNTRY.to_string());
            }
        }

        if let Some(typical) = profile.typical_max_amount() {
            // A threshold past the Decimal range is above every amount
            let unusual = match typical.checked_mul(self.config.amount_multiplier) {
                Some(threshold) => amount > threshold,
                None => false,
            };
            if unusual {
                factors.push(FACTOR_AMOUNT.to_string());
            }
        }

        if !profile.knows_recipient(&tx.recipient) {
            factors.push(FACTOR_RECIPIENT.to_string());
        }

        if self.is_quiet_hour(tx.timestamp.hour()) {
            factors.push(FACTOR_TIME.to_string());
        }

        factors
    }

    /// Level from the fired factors
    pub fn level_for(factors: &[String]) -> RiskLevel {
        let breaches_limit = factors.iter().any(|f| f == FACTOR_DAILY_LIMIT);

        match factors.len() {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            n if n >= 4 || breaches_limit => RiskLevel::Critical,
            _ => RiskLevel::High,
        }
    }

    fn is_quiet_hour(&self, hour: u32) -> bool {
        let (start, end) = (self.config.quiet_start_hour, self.config.quiet_end_hour);
        if start <= end {
            hour >= start && hour < end
        } else {
            // Window wraps midnight, e.g. 23..5
            hour >= start || hour < end
        }
    }

    fn explain(tx: &Transaction, profile: &AccountProfile, factors: &[String]) -> String {
        if factors.is_empty() {
            return format!(
                "Transaction {} appears normal for account {}: the amount is within typical \
                 ranges, the recipient is known and the location matches usual activity.",
                tx.id, profile.account_id
            );
        }

        format!(
            "Transaction {} ({} {} {}) shows {} risk factor(s) against the history of account {}: {}.",
            tx.id,
            tx.kind,
            tx.amount,
            tx.currency,
            factors.len(),
            profile.account_id,
            factors.join("; ")
        )
    }
}

#[async_trait]
impl RiskScorer for ProfileScorer {
    fn name(&self) -> &str {
        "ProfileScorer"
    }

    async fn assess(
        &self,
        transaction: &Transaction,
        profile: &AccountProfile,
    ) -> Result<RawAssessment, ScoringError> {
        let factors = self.factors(transaction, profile);
        let level = Self::level_for(&factors);
        let explanation = Self::explain(transaction, profile, &factors);

        tracing::debug!(
            transaction_id = %transaction.id,
            level = %level,
            factors = factors.len(),
            "Profile scorer assessed transaction"
        );

        Ok(RawAssessment::new(
            level.to_string().to_lowercase(),
            factors,
            explanation,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use txguard_core::{Amount, Currency, TransactionType};

    fn profile() -> AccountProfile {
        AccountProfile {
            account_id: "ACC-12345".to_string(),
            customer_name: "John Doe".to_string(),
            account_type: "Checking".to_string(),
            balance: dec!(35000),
            currency: Currency::Usd,
            daily_limit: dec!(10000),
            country: "United States".to_string(),
            usual_countries: vec!["United States".to_string(), "Canada".to_string()],
            usual_transaction_amounts: vec![dec!(100), dec!(500), dec!(1000)],
            usual_recipients: vec!["Jane Smith".to_string(), "Bob Johnson".to_string()],
            transaction_history_summary: String::new(),
        }
    }

    fn tx(amount: Decimal, recipient: &str, location: &str, hour: u32) -> Transaction {
        Transaction::new(
            "TRX-T",
            "ACC-12345",
            TransactionType::Transfer,
            Amount::new(amount).unwrap(),
            Currency::Usd,
            recipient,
            Utc.with_ymd_and_hms(2026, 1, 15, hour, 30, 0).unwrap(),
        )
        .with_location(location)
    }

    #[tokio::test]
    async fn test_normal_transfer_is_low() {
        let scorer = ProfileScorer::default();
        let raw = scorer
            .assess(&tx(dec!(1200), "Jane Smith", "New York, United States", 14), &profile())
            .await
            .unwrap();

        assert_eq!(raw.risk_level, "low");
        assert!(raw.risk_factors.is_empty());
        assert!(raw.risk_explanation.contains("appears normal"));
    }

    #[tokio::test]
    async fn test_new_recipient_only_is_medium() {
        let scorer = ProfileScorer::default();
        let raw = scorer
            .assess(&tx(dec!(300), "Corner Shop", "Toronto, Canada", 14), &profile())
            .await
            .unwrap();

        assert_eq!(raw.risk_level, "medium");
        assert_eq!(raw.risk_factors, vec![FACTOR_RECIPIENT.to_string()]);
    }

    #[test]
    fn test_large_foreign_wire_factors_in_order() {
        let scorer = ProfileScorer::default();
        let factors = scorer.factors(&tx(dec!(25000), "Acme Corp", "Lagos, Nigeria", 3), &profile());

        assert_eq!(
            factors,
            vec![
                FACTOR_DAILY_LIMIT.to_string(),
                FACTOR_COUNTRY.to_string(),
                FACTOR_AMOUNT.to_string(),
                FACTOR_RECIPIENT.to_string(),
                FACTOR_TIME.to_string(),
            ]
        );
        assert_eq!(ProfileScorer::level_for(&factors), RiskLevel::Critical);
    }

    #[test]
    fn test_two_factors_is_high() {
        let factors = vec![FACTOR_COUNTRY.to_string(), FACTOR_RECIPIENT.to_string()];
        assert_eq!(ProfileScorer::level_for(&factors), RiskLevel::High);
    }

    #[test]
    fn test_limit_breach_with_another_factor_is_critical() {
        let factors = vec![FACTOR_DAILY_LIMIT.to_string(), FACTOR_AMOUNT.to_string()];
        assert_eq!(ProfileScorer::level_for(&factors), RiskLevel::Critical);
    }

    #[test]
    fn test_quiet_window_wrapping_midnight() {
        let scorer = ProfileScorer::new(ProfileScorerConfig {
            quiet_start_hour: 23,
            quiet_end_hour: 5,
            ..ProfileScorerConfig::default()
        });
        assert!(scorer.is_quiet_hour(23));
        assert!(scorer.is_quiet_hour(2));
        assert!(!scorer.is_quiet_hour(12));
    }

    #[test]
    fn test_threshold_overflow_does_not_panic() {
        let mut profile = profile();
        profile.usual_transaction_amounts = vec![Decimal::MAX];
        profile.daily_limit = Decimal::MAX;
        let scorer = ProfileScorer::default();

        let factors = scorer.factors(&tx(dec!(1200), "Jane Smith", "New York, United States", 14), &profile);

        assert!(factors.is_empty());
    }
}

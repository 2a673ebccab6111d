//! Account profile - read-only reference data owned by the account source

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;

/// Historical profile of a sender account.
///
/// The pipeline never mutates a profile; it is looked up per transaction
/// and handed to the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_id: String,
    pub customer_name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub currency: Currency,
    pub daily_limit: Decimal,
    /// Home country of the account holder
    pub country: String,
    #[serde(default)]
    pub usual_countries: Vec<String>,
    #[serde(default)]
    pub usual_transaction_amounts: Vec<Decimal>,
    #[serde(default)]
    pub usual_recipients: Vec<String>,
    #[serde(default)]
    pub transaction_history_summary: String,
}

impl AccountProfile {
    /// Whether the recipient has been paid by this account before
    pub fn knows_recipient(&self, recipient: &str) -> bool {
        self.usual_recipients
            .iter()
            .any(|r| r.eq_ignore_ascii_case(recipient.trim()))
    }

    /// Whether the country is the home country or one of the usual ones
    pub fn is_usual_country(&self, country: &str) -> bool {
        let country = country.trim();
        self.country.eq_ignore_ascii_case(country)
            || self
                .usual_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(country))
    }

    /// Largest amount this account usually moves
    pub fn typical_max_amount(&self) -> Option<Decimal> {
        self.usual_transaction_amounts.iter().copied().max()
    }
}

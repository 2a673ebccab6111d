//! Transaction - Immutable record from the upstream data source

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::amount::Amount;
use crate::currency::Currency;

/// Kind of money movement
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Transfer,
    Wire,
    Payment,
    Deposit,
    Withdrawal,
    CurrencyExchange,
    Other,
}

impl TransactionType {
    /// Types that move funds across institutions and are harder to claw back
    pub fn is_outbound_transfer(&self) -> bool {
        matches!(
            self,
            TransactionType::Wire | TransactionType::Transfer | TransactionType::CurrencyExchange
        )
    }
}

/// A financial transaction submitted for review.
///
/// Field names on the wire follow the data source feed
/// (`transaction_id`, `account_id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier (e.g. `TRX-001`)
    #[serde(rename = "transaction_id")]
    pub id: String,

    /// Sender account identifier
    pub account_id: String,

    #[serde(rename = "transaction_type")]
    pub kind: TransactionType,

    pub amount: Amount,

    pub currency: Currency,

    /// Recipient name or identifier
    pub recipient: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_account: Option<String>,

    pub timestamp: DateTime<Utc>,

    /// Free-form location, e.g. "Lagos, Nigeria"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Explicit origin country; falls back to the last segment of `location`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Transaction {
    /// Create a transaction with the mandatory fields
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        kind: TransactionType,
        amount: Amount,
        currency: Currency,
        recipient: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            kind,
            amount,
            currency,
            recipient: recipient.into(),
            recipient_account: None,
            timestamp,
            location: None,
            country: None,
            ip_address: None,
            device_id: None,
        }
    }

    /// Set the free-form location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the recipient account
    pub fn with_recipient_account(mut self, account: impl Into<String>) -> Self {
        self.recipient_account = Some(account.into());
        self
    }

    /// Origin country of the transaction, if known
    pub fn origin_country(&self) -> Option<&str> {
        if let Some(country) = self.country.as_deref() {
            return Some(country.trim());
        }
        self.location
            .as_deref()
            .and_then(|loc| loc.rsplit(',').next())
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// One-line summary used in prompts and logs
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {} to {}",
            self.id, self.kind, self.amount, self.currency, self.recipient
        )
    }
}

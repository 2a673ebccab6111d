//! TxGuard Core - Domain types
//!
//! This crate contains the fundamental types shared by every TxGuard crate:
//! - `Amount`: Strictly positive decimal wrapper for transaction amounts
//! - `Currency`: Type-safe currency codes
//! - `Transaction`: Immutable transaction record from the upstream data source
//! - `AccountProfile`: Read-only account reference data used for scoring
//! - `Clock`: Injectable time source so audit trails can be replayed

pub mod account;
pub mod amount;
pub mod clock;
pub mod currency;
pub mod transaction;

pub use account::AccountProfile;
pub use amount::{Amount, AmountError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::{Currency, CurrencyError};
pub use transaction::{Transaction, TransactionType};

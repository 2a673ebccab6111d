//! TxGuard Engine - Transaction review pipeline
//!
//! Wires the account directory, the risk scorer, the approval policy, the
//! human confirmation protocol and the audit ledger into one
//! [`TransactionProcessor`].
//!
//! ## Guarantees
//!
//! - Nothing is approved without a LOW/MEDIUM assessment or a human APPROVE
//! - Every processing attempt is appended to the audit trail
//! - A failure in one transaction never stops the batch

pub mod config;
pub mod directory;
pub mod error;
pub mod processor;

pub use config::GuardConfig;
pub use directory::{AccountDirectory, InMemoryDirectory};
pub use error::{ProcessError, ProcessResult};
pub use processor::TransactionProcessor;

//! TxGuard Audit
//!
//! ```text
//! Outcome ──► AuditLedger::record ──► sequence + hash chain ──► JSONL line
//!                    │
//!                    ▼
//!              summarize() ──► AuditSummary ──► render_report()
//! ```
//!
//! ## Key Components
//!
//! - [`outcome::Outcome`] - one record per processing attempt
//! - [`ledger::AuditLedger`] - append-only, single writer, optional file sink
//! - [`summary::AuditSummary`] - counts, totals per currency, open items
//! - [`report::render_report`] - plain-text summary

pub mod error;
pub mod hash;
pub mod ledger;
pub mod outcome;
pub mod report;
pub mod summary;

pub use error::{AuditError, AuditResult};
pub use hash::{verify_chain, ChainError};
pub use ledger::AuditLedger;
pub use outcome::{Outcome, OutcomeStatus, AUTO_APPROVER};
pub use report::render_report;
pub use summary::{AuditSummary, SummaryRow};

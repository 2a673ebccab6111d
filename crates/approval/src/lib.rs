//! # TxGuard Approval Module
//!
//! Human confirmation for HIGH and CRITICAL risk transactions.
//!
//! ## State machine
//!
//! ```text
//!                  ┌──────────── InvalidVerdict (re-prompt)
//!                  ▼           │
//!           ┌───────────────┐──┘
//!           │ PendingReview │
//!           └──────┬────────┘
//!       approve    │ deny        investigate
//!     ┌────────────┼────────────────┐
//!     ▼            ▼                ▼
//! Approved      Denied     PendingInvestigation ──► resolve ──► PendingReview
//! ```
//!
//! ## Features
//! - `ConfirmationGateway` trait: the human transport is replaceable
//! - `ChannelGateway` + `ReviewQueue`: requests handed to an external
//!   channel and resumed when a response arrives
//! - `ScriptedGateway`: automated double that records every call
//! - `HoldRegistry`: at most one active investigation hold per transaction
//! - Never defaults to approve

mod channel;
mod error;
mod gateway;
mod hold;
mod protocol;
mod review;
mod scripted;
mod verdict;

pub use channel::{ChannelGateway, PendingConfirmation, ReviewQueue};
pub use error::{ApprovalError, GatewayError};
pub use gateway::{ConfirmationGateway, ConfirmationRequest};
pub use hold::{HoldRegistry, HoldUpdate, InvestigationHold};
pub use protocol::{ConfirmationProtocol, ReviewResult, HOLD_IDENTITY};
pub use review::{Review, ReviewState};
pub use scripted::ScriptedGateway;
pub use verdict::{HumanResponse, RawResponse, Verdict};

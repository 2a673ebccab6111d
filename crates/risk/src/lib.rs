//! TxGuard Risk - Scoring contract and approval routing
//!
//! ```text
//! Transaction + AccountProfile
//!            │
//!            ▼
//!      RiskScorer::assess ──► RawAssessment (wire shape)
//!            │
//!            ▼
//!   RiskAssessment::from_raw ──► InvalidRiskLevel / MissingRiskFactors
//!            │
//!            ▼
//!   ApprovalPolicy::route ──► AutoApprove | RequireHuman
//! ```
//!
//! The scorer is an external collaborator. This crate owns its contract,
//! validates what it returns, and maps the validated risk level onto a
//! routing decision through one fixed table.

pub mod assessment;
pub mod error;
pub mod level;
pub mod policy;
pub mod preset;
pub mod profile;
pub mod scorer;

pub use assessment::{RawAssessment, RiskAssessment};
pub use error::{RiskError, ScoringError};
pub use level::RiskLevel;
pub use policy::{ApprovalPolicy, RoutingDecision};
pub use preset::PresetScorer;
pub use profile::{ProfileScorer, ProfileScorerConfig};
pub use scorer::RiskScorer;

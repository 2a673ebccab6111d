//! Processor configuration
//!
//! Defaults hold without a config file; any field can be overridden from
//! JSON and then again from the command line.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use txguard_risk::ProfileScorerConfig;

/// Configuration for the [`crate::TransactionProcessor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    // === Scoring ===
    /// Upper bound on one scorer call. Exceeding it escalates to CRITICAL.
    #[serde(default = "default_scoring_timeout_ms")]
    pub scoring_timeout_ms: u64,

    /// Thresholds for the built-in profile scorer
    #[serde(default)]
    pub profile_scorer: ProfileScorerConfig,

    // === Review ===
    /// Re-prompts allowed after an invalid verdict before the transaction
    /// is held
    #[serde(default = "default_max_reprompts")]
    pub max_reprompts: u32,

    /// Reviewer the confirmation requests are addressed to
    #[serde(default = "default_reviewer_name")]
    pub reviewer_name: String,

    /// Requests allowed to wait in the review queue
    #[serde(default = "default_review_queue_capacity")]
    pub review_queue_capacity: usize,

    // === Batch ===
    /// Transactions processed at once; 1 keeps input order
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    // === Audit ===
    /// JSONL audit file; in-memory only when absent
    #[serde(default)]
    pub audit_path: Option<PathBuf>,
}

fn default_scoring_timeout_ms() -> u64 {
    3_000
}

fn default_max_reprompts() -> u32 {
    3
}

fn default_reviewer_name() -> String {
    "Security Analyst".to_string()
}

fn default_review_queue_capacity() -> usize {
    16
}

fn default_max_concurrency() -> usize {
    1
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            scoring_timeout_ms: default_scoring_timeout_ms(),
            profile_scorer: ProfileScorerConfig::default(),
            max_reprompts: default_max_reprompts(),
            reviewer_name: default_reviewer_name(),
            review_queue_capacity: default_review_queue_capacity(),
            max_concurrency: default_max_concurrency(),
            audit_path: None,
        }
    }
}

impl GuardConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Get scoring timeout as Duration
    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_millis(self.scoring_timeout_ms)
    }

    /// Concurrency, never below one
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

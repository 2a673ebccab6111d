//! Application context - wires everything together

use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use txguard_approval::{ChannelGateway, ConfirmationGateway, ScriptedGateway};
use txguard_audit::AuditLedger;
use txguard_core::Transaction;
use txguard_engine::{GuardConfig, InMemoryDirectory, TransactionProcessor};
use txguard_risk::{PresetScorer, ProfileScorer, RiskScorer};

use crate::console;

/// Default audit file when neither the config nor the command line sets one
pub const DEFAULT_AUDIT_PATH: &str = "./data/audit.jsonl";

/// Input files for commands that process transactions
#[derive(Debug, Clone)]
pub struct Inputs {
    pub transactions: PathBuf,
    pub accounts: PathBuf,
    /// Preset assessments; the profile scorer is used when absent
    pub presets: Option<PathBuf>,
    /// Scripted reviewer responses; the console is used when absent
    pub responses: Option<PathBuf>,
}

/// Application context - configuration and the audit trail
pub struct AppContext {
    pub config: GuardConfig,
    pub ledger: Arc<AuditLedger>,
}

impl AppContext {
    /// Load configuration and open the audit trail
    pub fn new(config_path: Option<&Path>, audit_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => GuardConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => GuardConfig::default(),
        };

        if let Some(path) = audit_override {
            config.audit_path = Some(path);
        }
        let audit_path = config
            .audit_path
            .get_or_insert_with(|| PathBuf::from(DEFAULT_AUDIT_PATH))
            .clone();

        let ledger = AuditLedger::open(&audit_path)
            .with_context(|| format!("opening audit trail {}", audit_path.display()))?;

        Ok(Self {
            config,
            ledger: Arc::new(ledger),
        })
    }

    /// Build a processor for the given inputs. Returns the console reviewer
    /// task when reviews go to the terminal.
    pub fn processor(
        &self,
        inputs: &Inputs,
    ) -> anyhow::Result<(TransactionProcessor, Option<JoinHandle<std::io::Result<usize>>>)> {
        let directory = InMemoryDirectory::from_file(&inputs.accounts)
            .with_context(|| format!("reading accounts {}", inputs.accounts.display()))?;

        let scorer: Arc<dyn RiskScorer> = match inputs.presets {
            Some(ref path) => Arc::new(
                PresetScorer::from_file(path)
                    .with_context(|| format!("reading presets {}", path.display()))?,
            ),
            None => Arc::new(ProfileScorer::new(self.config.profile_scorer.clone())),
        };

        let (gateway, reviewer) = match inputs.responses {
            Some(ref path) => (
                Arc::new(
                    ScriptedGateway::from_file(path)
                        .with_context(|| format!("reading responses {}", path.display()))?,
                ) as Arc<dyn ConfirmationGateway>,
                None,
            ),
            None => {
                let (gateway, queue) = ChannelGateway::new(self.config.review_queue_capacity);
                let reviewer = console::spawn(queue, self.config.reviewer_name.clone())
                    .context("starting console reviewer")?;
                (Arc::new(gateway) as Arc<dyn ConfirmationGateway>, Some(reviewer))
            }
        };

        tracing::debug!(
            scorer = scorer.name(),
            gateway = gateway.name(),
            accounts = directory.len(),
            "Processor ready"
        );

        let processor = TransactionProcessor::new(
            self.config.clone(),
            Arc::new(directory),
            scorer,
            gateway,
            self.ledger.clone(),
        );
        Ok((processor, reviewer))
    }
}

/// Load a JSON array of transactions
pub fn load_transactions(path: &Path) -> anyhow::Result<Vec<Transaction>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading transactions {}", path.display()))?;
    let transactions: Vec<Transaction> = serde_json::from_str(&content)
        .with_context(|| format!("parsing transactions {}", path.display()))?;
    Ok(transactions)
}

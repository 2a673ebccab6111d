//! Audit Ledger - Append-only outcome trail
//!
//! Every processing attempt lands here, in processing order. Records are
//! never overwritten: re-processing a transaction appends a new record.
//! With a file sink each record is written as one JSON line and flushed
//! before `record` returns. A failed append is rolled back to the previous
//! file length; if that fails too, the ledger refuses further appends.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{AuditError, AuditResult};
use crate::hash::{calculate_outcome_hash, verify_chain, GENESIS};
use crate::outcome::Outcome;
use crate::summary::AuditSummary;

struct LedgerState {
    records: Vec<Outcome>,
    file: Option<File>,
    /// Set when a failed append could not be rolled back
    failed: bool,
}

/// Append-only ledger of outcomes
pub struct AuditLedger {
    path: Option<PathBuf>,
    state: Mutex<LedgerState>,
}

impl AuditLedger {
    /// Ledger without a file sink
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(LedgerState {
                records: Vec::new(),
                file: None,
                failed: false,
            }),
        }
    }

    /// Open (or create) a JSONL audit file, restoring and verifying the
    /// records already in it
    pub fn open(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records = if path.exists() {
            read_records(&path)?
        } else {
            Vec::new()
        };
        verify_chain(&records)?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        tracing::info!(path = %path.display(), records = records.len(), "Audit ledger opened");

        Ok(Self {
            path: Some(path),
            state: Mutex::new(LedgerState {
                records,
                file: Some(file),
                failed: false,
            }),
        })
    }

    /// Append an outcome, assigning its sequence number and chain hashes.
    /// Returns the record as stored.
    pub async fn record(&self, outcome: Outcome) -> AuditResult<Outcome> {
        let mut state = self.state.lock().await;
        if state.failed {
            return Err(AuditError::SinkFailed);
        }

        let mut outcome = outcome;
        outcome.sequence = state.records.len() as u64 + 1;
        outcome.prev_hash = state
            .records
            .last()
            .map(|last| last.hash.clone())
            .unwrap_or_else(|| GENESIS.to_string());
        outcome.hash = calculate_outcome_hash(&outcome);

        if let Some(file) = state.file.as_mut() {
            let json = serde_json::to_string(&outcome)?;
            if let Err((e, rolled_back)) = append_line(file, &json) {
                tracing::error!(
                    sequence = outcome.sequence,
                    error = %e,
                    rolled_back,
                    "Audit append failed"
                );
                if !rolled_back {
                    state.failed = true;
                }
                return Err(e.into());
            }
        }

        tracing::info!(
            sequence = outcome.sequence,
            transaction_id = %outcome.transaction_id,
            status = %outcome.status,
            approved_by = outcome.approved_by.as_deref().unwrap_or("-"),
            "Outcome recorded"
        );

        state.records.push(outcome.clone());
        Ok(outcome)
    }

    /// All records in insertion order
    pub async fn records(&self) -> Vec<Outcome> {
        self.state.lock().await.records.clone()
    }

    /// Records for one transaction, oldest first
    pub async fn history(&self, transaction_id: &str) -> Vec<Outcome> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .filter(|r| r.transaction_id == transaction_id)
            .cloned()
            .collect()
    }

    /// Most recent record for a transaction
    pub async fn latest(&self, transaction_id: &str) -> Option<Outcome> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .rev()
            .find(|r| r.transaction_id == transaction_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.records.is_empty()
    }

    pub async fn summarize(&self) -> AuditResult<AuditSummary> {
        AuditSummary::from_records(&self.state.lock().await.records)
    }

    /// Re-check the hash chain of the records held in memory
    pub async fn verify(&self) -> AuditResult<()> {
        verify_chain(&self.state.lock().await.records)?;
        Ok(())
    }

    /// Path of the file sink
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Write one line and flush it. On failure the file is truncated back to
/// its previous length; the flag reports whether that truncation worked.
fn append_line(file: &mut File, line: &str) -> Result<(), (io::Error, bool)> {
    let offset = file.metadata().map_err(|e| (e, true))?.len();

    match writeln!(file, "{}", line).and_then(|()| file.flush()) {
        Ok(()) => Ok(()),
        Err(e) => Err((e, file.set_len(offset).is_ok())),
    }
}

fn read_records(path: &Path) -> AuditResult<Vec<Outcome>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome: Outcome = serde_json::from_str(&line).map_err(|e| AuditError::Corrupt {
            line: i + 1,
            reason: e.to_string(),
        })?;
        records.push(outcome);
    }

    Ok(records)
}

//! CLI commands

use tokio::sync::watch;
use txguard_audit::{render_report, AuditSummary, Outcome, OutcomeStatus};

use crate::context::{load_transactions, AppContext, Inputs};

/// Process every transaction in the input file.
///
/// Ctrl-C cancels the run: reviews in flight and transactions not yet
/// started are held for investigation.
pub async fn run(ctx: &AppContext, inputs: &Inputs) -> anyhow::Result<Vec<Outcome>> {
    let transactions = load_transactions(&inputs.transactions)?;
    let (processor, reviewer) = ctx.processor(inputs)?;

    println!("Processing {} transactions...", transactions.len());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, holding unfinished reviews");
            let _ = cancel_tx.send(true);
        }
    });

    let outcomes = processor.process_batch_until(&transactions, cancel_rx).await;

    interrupt.abort();
    if let Some(reviewer) = reviewer {
        reviewer.abort();
    }

    let outcomes = outcomes?;
    for outcome in &outcomes {
        print_outcome(outcome);
    }
    Ok(outcomes)
}

/// Ask again for a verdict on held transactions. With no id, every open
/// hold is reviewed.
pub async fn resolve(
    ctx: &AppContext,
    inputs: &Inputs,
    transaction_id: Option<&str>,
) -> anyhow::Result<Vec<Outcome>> {
    let transactions = load_transactions(&inputs.transactions)?;
    let (processor, reviewer) = ctx.processor(inputs)?;

    let restored = processor.restore_holds(&transactions).await;
    tracing::debug!(restored, "Holds available for resolution");

    let ids: Vec<String> = match transaction_id {
        Some(id) => vec![id.to_string()],
        None => processor
            .open_holds()
            .await
            .into_iter()
            .map(|hold| hold.transaction.id)
            .collect(),
    };

    if ids.is_empty() {
        println!("No open investigation holds");
    }

    let mut outcomes = Vec::with_capacity(ids.len());
    let mut failure = None;
    for id in &ids {
        match processor.resolve(id).await {
            Ok(outcome) => {
                print_outcome(&outcome);
                outcomes.push(outcome);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if let Some(reviewer) = reviewer {
        reviewer.abort();
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(outcomes),
    }
}

/// Summary of the audit trail, as text or JSON
pub async fn summary(ctx: &AppContext, json: bool) -> anyhow::Result<AuditSummary> {
    let summary = ctx.ledger.summarize().await?;

    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", render_report(&summary));
    }
    Ok(summary)
}

/// Verify the audit hash chain
pub async fn verify(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.ledger.verify().await?;
    println!("Audit chain verified ({} records)", ctx.ledger.len().await);
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    let risk = outcome
        .risk_level
        .map(|level| level.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    println!(
        "- {} ({}): {} [risk {}]",
        outcome.transaction_id, outcome.transaction_type, outcome.status, risk
    );
    match outcome.status {
        OutcomeStatus::Approved | OutcomeStatus::Denied => {
            println!(
                "  by {} at {}",
                outcome.approved_by.as_deref().unwrap_or("Unknown"),
                outcome.decided_at.to_rfc3339()
            );
        }
        OutcomeStatus::PendingInvestigation | OutcomeStatus::Error => {
            if let Some(ref note) = outcome.note {
                println!("  {}", note);
            }
        }
    }
}

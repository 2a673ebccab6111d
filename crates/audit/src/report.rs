//! Human-readable transaction summary

use std::fmt::Write;

use crate::outcome::OutcomeStatus;
use crate::summary::AuditSummary;

/// Render the summary as plain text
pub fn render_report(summary: &AuditSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "===== TRANSACTION SUMMARY =====");
    for row in &summary.rows {
        let _ = writeln!(out, "- {} ({}): {}", row.transaction_id, row.transaction_type, row.status);
        let _ = writeln!(out, "  Amount: {} {}", row.amount, row.currency);
        match row.risk_level {
            Some(level) => {
                let _ = writeln!(out, "  Risk Level: {}", level);
            }
            None => {
                let _ = writeln!(out, "  Risk Level: N/A");
            }
        }
        if row.status.is_terminal() {
            let _ = writeln!(
                out,
                "  Approved by: {}",
                row.approved_by.as_deref().unwrap_or("Unknown")
            );
            let _ = writeln!(out, "  Approval date: {}", row.decided_at.to_rfc3339());
        }
        if let Some(ref note) = row.note {
            let _ = writeln!(out, "  Note: {}", note);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "===== TOTALS =====");
    for (status, count) in &summary.counts {
        let _ = write!(out, "{}: {}", status, count);
        if let Some(by_currency) = summary.totals.get(status) {
            let amounts: Vec<String> = by_currency
                .iter()
                .map(|(currency, total)| format!("{} {}", total, currency))
                .collect();
            if !amounts.is_empty() {
                let _ = write!(out, " ({})", amounts.join(", "));
            }
        }
        let _ = writeln!(out);
    }

    if !summary.open_items.is_empty() {
        let _ = writeln!(
            out,
            "\nOpen items ({}): {}",
            OutcomeStatus::PendingInvestigation,
            summary.open_items.join(", ")
        );
    }

    out
}

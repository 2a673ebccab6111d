//! Console reviewer - answers confirmation requests from a terminal
//!
//! Stdin is read on a plain thread that forwards lines over a channel. A
//! read still waiting when the run ends never holds up runtime shutdown.

use std::io::BufRead;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use txguard_approval::{RawResponse, ReviewQueue};

/// Prompt for every queued request and send back the next line typed.
///
/// Stops when the queue closes or input ends. A request pending at end of
/// input is dropped unanswered, which holds its transaction.
pub async fn drain<W>(
    mut queue: ReviewQueue,
    mut lines: mpsc::Receiver<String>,
    mut output: W,
    reviewer: String,
) -> std::io::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut answered = 0;

    while let Some(pending) = queue.next().await {
        let alert = pending.request.render_alert();
        output.write_all(format!("\n{}\n> ", alert).as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.recv().await else {
            tracing::warn!(
                transaction_id = %pending.request.transaction.id,
                "Console input closed before a verdict was given"
            );
            break;
        };

        if pending
            .respond(RawResponse::new(line.trim(), reviewer.clone()))
            .is_err()
        {
            tracing::warn!("Review abandoned before the answer arrived");
        }
        answered += 1;
    }

    Ok(answered)
}

/// Run [`drain`] on stdin/stdout in the background
pub fn spawn(
    queue: ReviewQueue,
    reviewer: String,
) -> std::io::Result<tokio::task::JoinHandle<std::io::Result<usize>>> {
    let lines = stdin_lines()?;
    Ok(tokio::spawn(drain(queue, lines, tokio::io::stdout(), reviewer)))
}

/// Lines typed on stdin. The reader thread ends at end of input or once
/// the receiver is gone; a process exiting mid-read does not wait for it.
fn stdin_lines() -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(1);

    std::thread::Builder::new()
        .name("txguard-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;

    Ok(rx)
}

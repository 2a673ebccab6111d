//! TxGuard CLI - Main entry point

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use txguard_cli::{commands, AppContext, Inputs};

#[derive(Parser)]
#[command(name = "txguard")]
#[command(about = "TxGuard - risk-scored transaction approval with human review", long_about = None)]
struct Cli {
    /// Config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Audit trail (JSONL); overrides the config file
    #[arg(long)]
    audit: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct InputArgs {
    /// Transactions file (JSON array)
    #[arg(long)]
    transactions: PathBuf,

    /// Account profiles file (JSON array)
    #[arg(long)]
    accounts: PathBuf,

    /// Preset assessments keyed by transaction id
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Scripted reviewer responses keyed by transaction id
    #[arg(long)]
    responses: Option<PathBuf>,

    /// Reviewer the confirmation requests are addressed to
    #[arg(long)]
    reviewer: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score, route and review a batch of transactions
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Transactions processed at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Scorer timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Re-prompts allowed after an invalid verdict
        #[arg(long)]
        max_reprompts: Option<u32>,
    },

    /// Review held transactions again
    Resolve {
        #[command(flatten)]
        inputs: InputArgs,

        /// Transaction to resolve; all open holds when omitted
        transaction_id: Option<String>,
    },

    /// Print the transaction summary from the audit trail
    Summary {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Verify the audit hash chain
    Verify,
}

impl InputArgs {
    fn into_inputs(self) -> Inputs {
        Inputs {
            transactions: self.transactions,
            accounts: self.accounts,
            presets: self.presets,
            responses: self.responses,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = AppContext::new(cli.config.as_deref(), cli.audit)?;

    match cli.command {
        Commands::Run {
            inputs,
            concurrency,
            timeout_ms,
            max_reprompts,
        } => {
            if let Some(reviewer) = inputs.reviewer.clone() {
                ctx.config.reviewer_name = reviewer;
            }
            if let Some(concurrency) = concurrency {
                ctx.config.max_concurrency = concurrency;
            }
            if let Some(timeout_ms) = timeout_ms {
                ctx.config.scoring_timeout_ms = timeout_ms;
            }
            if let Some(max_reprompts) = max_reprompts {
                ctx.config.max_reprompts = max_reprompts;
            }

            commands::run(&ctx, &inputs.into_inputs()).await?;
            println!();
            commands::summary(&ctx, false).await?;
        }

        Commands::Resolve {
            inputs,
            transaction_id,
        } => {
            if let Some(reviewer) = inputs.reviewer.clone() {
                ctx.config.reviewer_name = reviewer;
            }
            commands::resolve(&ctx, &inputs.into_inputs(), transaction_id.as_deref()).await?;
        }

        Commands::Summary { json } => {
            commands::summary(&ctx, json).await?;
        }

        Commands::Verify => {
            commands::verify(&ctx).await?;
        }
    }

    Ok(())
}

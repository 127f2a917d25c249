//! ghprofile CLI - submit profile README generations and wait for them

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ghprofile_sdk::{GhProfileClient, JobStatus, JobStatusPoller, PollOutcome, PollerConfig};
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "ghprofile")]
#[command(about = "GitHub profile README generator CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "GHPROFILE_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a profile README and wait for the result
    Generate {
        /// GitHub username
        username: String,

        /// Comma-separated mods (rick_astley, yoda)
        #[arg(short, long, value_delimiter = ',')]
        mods: Vec<String>,

        /// Print the execution id and return immediately
        #[arg(long)]
        no_wait: bool,

        /// Give up waiting after this many seconds
        #[arg(long, default_value = "300")]
        max_wait: u64,
    },

    /// Show a job's current state
    Status {
        /// Execution ID
        id: String,
    },

    /// Cancel a job
    Cancel {
        /// Execution ID
        id: String,
    },
}

#[derive(Tabled)]
struct StatusRow {
    id: String,
    state: String,
    error: String,
}

impl From<&JobStatus> for StatusRow {
    fn from(status: &JobStatus) -> Self {
        Self {
            id: status.id.clone(),
            state: format!("{:?}", status.state).to_lowercase(),
            error: status.error.clone().unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Arc::new(
        GhProfileClient::connect(&cli.rpc_url)
            .await
            .context("Failed to connect to daemon")?,
    );

    match cli.command {
        Commands::Generate {
            username,
            mods,
            no_wait,
            max_wait,
        } => {
            let submitted = client
                .submit(&username, mods.as_slice())
                .await
                .context("Failed to submit job")?;

            if no_wait {
                println!("{}", submitted.id);
                return Ok(());
            }
            eprintln!(
                "{} {}",
                "Generating... execution id".cyan(),
                submitted.id.bold()
            );

            let config = PollerConfig {
                max_wait: Some(Duration::from_secs(max_wait)),
                ..PollerConfig::default()
            };
            let mut poller = JobStatusPoller::new(Arc::clone(&client), config);
            let control = poller.control();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    control.stop();
                }
            });

            match poller.start(submitted.id.clone()).await {
                PollOutcome::Completed(text) => println!("{}", text),
                PollOutcome::Failed(error) => {
                    anyhow::bail!("Generation failed: {}", error);
                }
                PollOutcome::Cancelled => {
                    eprintln!("{}", "Job was cancelled".yellow());
                }
                PollOutcome::TimedOut => {
                    anyhow::bail!(
                        "Timed out after {}s; check later with `ghprofile status {}`",
                        max_wait,
                        submitted.id
                    );
                }
                PollOutcome::Stopped => {
                    client
                        .cancel(&submitted.id)
                        .await
                        .context("Failed to cancel job")?;
                    eprintln!("{}", format!("✓ Job {} cancelled", submitted.id).yellow());
                }
            }
        }

        Commands::Status { id } => {
            let status = client.status(&id).await.context("Failed to fetch status")?;
            println!("{}", Table::new(vec![StatusRow::from(&status)]));
            if let Some(result) = status.result {
                println!();
                println!("{}", result);
            }
        }

        Commands::Cancel { id } => {
            let resp = client.cancel(&id).await.context("Failed to cancel job")?;
            if resp.cancelled {
                println!("{}", format!("✓ Job {} cancelled", resp.id).green().bold());
            } else {
                println!("{}", format!("Job {} not cancelled", resp.id).yellow());
            }
        }
    }

    Ok(())
}

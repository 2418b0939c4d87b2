use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing::info;

use crate::engine::PlanEngine;
use crate::events::RedisJobFeed;
use crate::types::{AnalysisSessionState, SessionStatus};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusArg {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl From<StatusArg> for SessionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => SessionStatus::Pending,
            StatusArg::Processing => SessionStatus::Processing,
            StatusArg::Completed => SessionStatus::Completed,
            StatusArg::Failed => SessionStatus::Failed,
        }
    }
}

#[derive(Subcommand)]
pub enum JobCommands {
    /// Write a session record and notify watchers
    Publish {
        job_id: String,

        #[arg(long, value_enum)]
        status: StatusArg,

        #[arg(long)]
        progress: Option<u8>,

        #[arg(long)]
        phase: Option<String>,

        #[arg(long)]
        error: Option<String>,
    },

    /// Follow a session and report each completion
    Watch {
        job_id: String,

        /// Exit after the first completion
        #[arg(long)]
        once: bool,
    },
}

impl JobCommands {
    pub async fn execute(&self, engine: &PlanEngine) -> Result<()> {
        let redis_url = engine
            .config()
            .redis_url
            .clone()
            .context("PLANGATE_REDIS_URL is required for job commands")?;
        let feed = RedisJobFeed::open(&redis_url)?;

        match self {
            JobCommands::Publish {
                job_id,
                status,
                progress,
                phase,
                error,
            } => {
                let status = SessionStatus::from(*status);
                let mut record = AnalysisSessionState::with_status(status);
                record.progress_percent = *progress;
                record.phase = phase.clone();
                record.error = error.clone();
                if status == SessionStatus::Completed {
                    record.completed_at = Some(Utc::now());
                }
                feed.publish_state(job_id, &record).await?;
                println!("Published {:?} for {}", status, job_id);
                Ok(())
            }
            JobCommands::Watch { job_id, once } => {
                let watcher = engine.session_watcher(Arc::new(feed));
                let (done_tx, mut done_rx) = mpsc::unbounded_channel();
                let handle = watcher
                    .watch(job_id, move || {
                        let _ = done_tx.send(());
                    })
                    .await;

                loop {
                    tokio::select! {
                        fired = done_rx.recv() => {
                            if fired.is_none() {
                                break;
                            }
                            println!("Analysis {} completed", job_id);
                            if *once {
                                break;
                            }
                        }
                        _ = tokio::signal::ctrl_c() => {
                            info!("Interrupted");
                            break;
                        }
                    }
                }

                if let Some(latest) = handle.latest() {
                    println!("{}", serde_json::to_string_pretty(&latest)?);
                }
                handle.unsubscribe();
                Ok(())
            }
        }
    }
}

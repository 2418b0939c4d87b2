pub mod dismissals;
pub mod job;
pub mod plan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cmd::{
    dismissals::DismissalCommands,
    job::JobCommands,
    plan::{AccountArgs, EngagementArgs},
};

#[derive(Parser)]
#[command(name = "plangate")]
#[command(about = "Plan entitlements and upgrade banner decisions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Overrides PLANGATE_STATE_DIR
    #[arg(long, global = true)]
    pub state_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute usage and quotas for an account
    Entitlement {
        #[command(flatten)]
        account: AccountArgs,
    },

    /// Decide which upgrade banner to show
    Banner {
        #[command(flatten)]
        account: AccountArgs,

        #[command(flatten)]
        engagement: EngagementArgs,

        /// Raw body of a quota error received just before rendering
        #[arg(long)]
        limit_hit: Option<String>,

        /// List every matching rule instead of the winner
        #[arg(long)]
        explain: bool,
    },

    /// Classify an API error response as a limit hit
    Classify {
        #[arg(long, default_value_t = 403)]
        status: u16,

        /// Response body (JSON)
        #[arg(long)]
        body: String,
    },

    /// Dismiss a banner kind for the configured TTL
    Dismiss {
        /// Banner kind, e.g. welcome_free
        kind: String,
    },

    /// Inspect or reset stored dismissals
    #[command(subcommand)]
    Dismissals(DismissalCommands),

    /// Publish or watch analysis session records
    #[command(subcommand)]
    Job(JobCommands),
}

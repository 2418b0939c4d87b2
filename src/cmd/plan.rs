use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use tracing::info;

use crate::banner::EngagementMetrics;
use crate::engine::PlanEngine;
use crate::types::{AccountRecord, ApiErrorResponse, BannerKind, ProjectAggregates};
use crate::utils::constants::QUOTA_EXCEEDED_STATUS;

#[derive(Args, Debug)]
pub struct AccountArgs {
    /// JSON file holding the account record
    #[arg(long)]
    pub account: PathBuf,

    /// Number of projects owned
    #[arg(long, default_value_t = 0)]
    pub projects: u64,

    /// Number of projects with a finished analysis
    #[arg(long, default_value_t = 0)]
    pub analyses: u64,

    /// Opinion count of each project, comma separated
    #[arg(long, value_delimiter = ',')]
    pub opinions: Vec<u64>,
}

impl AccountArgs {
    pub fn load(&self) -> Result<(AccountRecord, ProjectAggregates)> {
        let raw = std::fs::read_to_string(&self.account)
            .with_context(|| format!("reading {}", self.account.display()))?;
        let account: AccountRecord =
            serde_json::from_str(&raw).context("parsing account record")?;
        let projects = ProjectAggregates {
            count: self.projects,
            analyzed_count: self.analyses,
            opinions_per_project: self.opinions.clone(),
        };
        Ok((account, projects))
    }
}

#[derive(Args, Debug)]
pub struct EngagementArgs {
    /// Projects with a completed analysis
    #[arg(long, default_value_t = 0)]
    pub completed: u32,
}

impl EngagementArgs {
    pub fn metrics(&self, projects: &ProjectAggregates) -> EngagementMetrics {
        EngagementMetrics {
            project_count: u32::try_from(projects.count).unwrap_or(u32::MAX),
            analysis_count: u32::try_from(projects.analyzed_count).unwrap_or(u32::MAX),
            completed_project_count: self.completed,
        }
    }
}

pub fn entitlement(engine: &PlanEngine, args: &AccountArgs) -> Result<()> {
    let (account, projects) = args.load()?;
    let snapshot = engine.compute_entitlement(&account, &projects);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

pub fn banner(
    engine: &PlanEngine,
    args: &AccountArgs,
    engagement: &EngagementArgs,
    limit_hit: Option<&str>,
    explain: bool,
) -> Result<()> {
    if let Some(body) = limit_hit {
        let resp = ApiErrorResponse::new(QUOTA_EXCEEDED_STATUS, body);
        if engine.classify(&resp).is_none() {
            info!("Supplied error body is not a limit hit");
        }
    }

    let (account, projects) = args.load()?;
    let snapshot = engine.compute_entitlement(&account, &projects);
    let metrics = engagement.metrics(&projects);

    if explain {
        let all = engine.explain_banners(&snapshot, &metrics);
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    match engine.decide_banner(&snapshot, &metrics) {
        Some(decision) => println!("{}", serde_json::to_string_pretty(&decision)?),
        None => println!("null"),
    }
    Ok(())
}

pub fn classify(engine: &PlanEngine, status: u16, body: &str) -> Result<()> {
    let resp = ApiErrorResponse::new(status, body);
    match engine.classify(&resp) {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => println!("null"),
    }
    Ok(())
}

pub fn dismiss(engine: &PlanEngine, kind: &str) -> Result<()> {
    let kind: BannerKind = kind.parse().map_err(|e: String| anyhow!(e))?;
    engine.dismiss(kind)?;
    println!("Dismissed {}", kind);
    Ok(())
}

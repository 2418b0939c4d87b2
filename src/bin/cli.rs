use std::path::Path;

use anyhow::Result;
use clap::Parser;
use plangate::{
    PlanEngine,
    cmd::{Cli, Commands, plan},
    utils::{config::EngineConfig, logs_fmt::UptimeSeconds},
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = if cli.verbose { "plangate=debug" } else { "plangate=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UptimeSeconds)
        .with_target(false)
        .compact();

    let (file_layer, guard) = match &cli.log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "plangate.log".to_string());
            let appender = tracing_appender::rolling::daily(dir.unwrap_or(Path::new(".")), name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli)?;

    let mut cfg = EngineConfig::load()?;
    if let Some(dir) = &cli.state_dir {
        cfg.state_dir = dir.clone();
    }
    info!(state_dir = %cfg.state_dir, "Plangate starting");

    let engine = PlanEngine::open(cfg)?;

    match &cli.command {
        Commands::Entitlement { account } => plan::entitlement(&engine, account)?,
        Commands::Banner {
            account,
            engagement,
            limit_hit,
            explain,
        } => plan::banner(&engine, account, engagement, limit_hit.as_deref(), *explain)?,
        Commands::Classify { status, body } => plan::classify(&engine, *status, body)?,
        Commands::Dismiss { kind } => plan::dismiss(&engine, kind)?,
        Commands::Dismissals(cmd) => cmd.execute(&engine)?,
        Commands::Job(cmd) => cmd.execute(&engine).await?,
    }

    Ok(())
}

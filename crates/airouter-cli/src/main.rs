//! CLI entry point - the composition root.
//!
//! Parses configuration, installs logging, starts the router through the
//! supervisor and stops it on Ctrl-C.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use airouter_cli::{Cli, CliError};
use airouter_runtime::RouterSupervisor;

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.router_config();
    config.validate()?;

    info!(
        backend_host = %config.backend_host,
        start_port = config.start_port,
        end_port = config.end_port,
        interval = ?config.scan_interval,
        "Starting airouter"
    );

    let supervisor = RouterSupervisor::new();
    let addr = supervisor.start(config).await?;
    info!("Router listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Router(format!("Failed to listen for shutdown signal: {e}")))?;

    info!("Shutdown requested");
    supervisor.stop().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.default_log_level());

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}

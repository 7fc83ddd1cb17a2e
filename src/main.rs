//! Opswatch - operational monitoring companion for the accounting backend.
//!
//! Main entry point: configuration bootstrap, builtin task registration,
//! scheduler loop, and the HTTP surface.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use opswatch_api::{ApiServer, AppState};
use opswatch_config::{Config, ConfigLoader};
use opswatch_gateway::{DataGateway, RestGateway};
use opswatch_scheduler::{Scheduler, TaskRegistry};

mod tasks;

/// Opswatch CLI.
#[derive(Parser)]
#[command(name = "opswatch")]
#[command(about = "Operational monitoring for the accounting backend")]
#[command(version)]
struct Cli {
    /// Optional TOML config file; without it configuration comes from the
    /// environment.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring service (default)
    Run {
        /// Listening host override
        #[arg(long)]
        host: Option<String>,

        /// Listening port override
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate configuration and exit
    CheckConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Ok(ConfigLoader::load(path)?),
        None => Ok(Config::from_env()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run {
        host: None,
        port: None,
    }) {
        Commands::Run { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            run(config).await
        }
        Commands::CheckConfig => {
            config.validate()?;
            info!("Configuration is valid");
            Ok(())
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    // Missing backend settings are fatal at boot.
    config.validate()?;

    if config.auth.api_key.is_none() {
        warn!("No API key configured; protected routes are OPEN");
    }
    if config.auth.allowed_origins.is_empty() {
        warn!("No allowed origins configured; cross-origin requests are not restricted");
    }

    let gateway: Arc<dyn DataGateway> = Arc::new(RestGateway::new(
        &config.backend.url,
        &config.backend.service_key,
    ));

    let registry = Arc::new(TaskRegistry::new());
    tasks::register_builtin(&registry, gateway.clone())?;
    info!("Registered {} builtin task(s)", registry.len());

    let scheduler = Arc::new(
        Scheduler::new(registry, config.scheduler.history_limit)
            .with_tick_interval(Duration::from_secs(config.scheduler.tick_secs)),
    );

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    let loop_handle = tokio::spawn(scheduler.clone().run_loop(cancel_rx));

    let state = Arc::new(AppState::new(
        scheduler,
        gateway,
        config.auth.api_key.clone(),
        config.auth.allowed_origins.clone(),
        tasks::ACCOUNTING_TABLES
            .iter()
            .map(|t| t.to_string())
            .collect(),
    ));

    let server = ApiServer::new(config.server.clone(), state);
    info!("Dashboard available at http://{}/dashboard", server.addr());

    server.run_until(shutdown_signal()).await?;

    // Stop the scheduler loop; in-flight runs are abandoned with the process.
    cancel_tx.send(true).ok();
    loop_handle.await.ok();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dindinho_config::DindinhoConfig;
use dindinho_db::service::DindinhoService;
use dindinho_server::{AppState, app};

/// Dindinho personal-finance API server.
#[derive(Debug, Parser)]
#[command(name = "dindinho", version, about)]
struct Cli {
    /// Extra TOML config file, layered above the standard locations.
    #[arg(short, long, env = "DINDINHO_CONFIG")]
    config: Option<PathBuf>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("dindinho error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        DindinhoConfig::load_with_dotenv(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.server.log_level)?;
    config.validate_for_server().context("invalid server configuration")?;

    let service = DindinhoService::from_config(&config.database)
        .await
        .with_context(|| format!("failed to open database '{}'", config.database.url))?;

    let expired = service
        .expire_stale_invites(chrono::Utc::now())
        .await
        .context("failed to expire stale invites")?;
    tracing::info!(count = expired.len(), "startup invite sweep done");

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, app = %config.app.name, "listening");

    axum::serve(listener, app(AppState::new(service, config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("DINDINHO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

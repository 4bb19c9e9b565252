use std::path::PathBuf;

use anyhow::Context;
use calcsrv::{create_routes, AppState, Config, SERVICE_NAME, SERVICE_VERSION};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long, env = "CALCSRV_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.service.port = port;
        config.validate()?;
    }

    let _log_guard = common::init_logging(&config.log).context("Failed to initialize logging")?;
    info!("Starting {} v{}", SERVICE_NAME, SERVICE_VERSION);

    let addr = config.bind_addr()?;
    info!("History log capacity: {} records", config.history.capacity);
    let app = create_routes(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::wait_for_shutdown())
        .await
        .context("API server error")?;

    info!("{} stopped", SERVICE_NAME);
    Ok(())
}

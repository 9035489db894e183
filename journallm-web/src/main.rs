//! journallm-web - journal upload and advice service
//!
//! Upload a journal export, poll its job, read the generated report.
//! Default address: 127.0.0.1:5000

use anyhow::{Context, Result};
use clap::Parser;
use journallm_common::config::{self, CliOverrides, Settings};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use journallm_web::AppState;

/// Command-line arguments for journallm-web
#[derive(Parser, Debug)]
#[command(name = "journallm-web")]
#[command(about = "Journal upload and advice service", long_about = None)]
#[command(version)]
struct Args {
    /// Address to listen on (e.g. 0.0.0.0:8080)
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server-side API key (uploads may then omit one)
    #[arg(long, env = "JOURNALLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap sees its values
    config::load_dotenv();
    let args = Args::parse();

    let toml_config = config::load_toml_config(args.config.as_deref())?;

    let cli = CliOverrides {
        api_key: args.api_key.clone(),
        bind_address: args.bind.clone(),
        log_level: args.debug.then(|| "debug".to_string()),
        ..CliOverrides::default()
    };
    let settings = Settings::resolve(&cli, &toml_config)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "Starting journallm-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Settings: {:?}", settings);

    if settings.api_key.is_none() {
        warn!("No server API key configured; every upload must supply one");
    }

    let state = AppState::from_settings(&settings)?;
    let app = journallm_web::build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_address))?;
    info!("Listening on http://{}", settings.bind_address);
    info!("Health check: http://{}/health", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

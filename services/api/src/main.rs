//! API Service - Serves aggregated HVStat crop statistics
//!
//! The dataset is read once at startup. If it cannot be loaded the service
//! still starts and answers data requests with 503.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use api::{create_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "api", about = "Serves aggregated crop statistics over HTTP")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8080", env = "API_BIND")]
    bind: String,

    /// Path to the HVStat CSV dataset
    #[arg(
        long,
        default_value = "data/hvstat_africa_data_v1.0.csv",
        env = "HVSTAT_DATA_PATH"
    )]
    data_path: PathBuf,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(true).init();

    info!("=== HVStat API ===");
    let state = Arc::new(AppState::load(&args.data_path));

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    info!("API listening on http://{}", args.bind);
    info!("Endpoints:");
    info!("  GET /health");
    info!("  GET /api/countries");
    info!("  GET /api/admin1?country=");
    info!("  GET /api/admin2?country=&admin_1_name=");
    info!("  GET /api/data?country=&admin_level=&admin_1_name=&admin_2_name=&timeseries_admin_level=&split_by_season=");
    info!("  GET /api/crop-timeseries?country=&admin_level=&crop_name=&...");

    axum::serve(listener, app).await?;

    Ok(())
}

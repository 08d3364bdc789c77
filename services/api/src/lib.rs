//! API Service - HTTP surface over the HVStat aggregation engine
//!
//! Endpoints:
//! - GET /health - Dataset status
//! - GET /api/countries - Countries in the dataset
//! - GET /api/admin1 - Admin-1 units of a country
//! - GET /api/admin2 - Admin-2 units of an admin-1 unit
//! - GET /api/data - Area summary with per-crop breakdown
//! - GET /api/crop-timeseries - Time series of a single crop

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod params;
pub mod state;

pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS for web frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/countries", get(handlers::countries_handler))
        .route("/api/admin1", get(handlers::admin1_handler))
        .route("/api/admin2", get(handlers::admin2_handler))
        .route("/api/data", get(handlers::data_handler))
        .route("/api/crop-timeseries", get(handlers::crop_timeseries_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! HTTP handlers. Each one validates its parameters, runs the matching
//! query against the shared table and returns JSON.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use harvest_core::{summary, AreaSummary, CropTimeSeries, LoadReport};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::params::{Admin2Params, CountryParams, DataParams};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: &'static str,
    pub data_loaded: bool,
    pub rows: usize,
    pub columns: Vec<&'static str>,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub report: Option<LoadReport>,
    pub load_error: Option<String>,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        data_loaded: state.data_loaded(),
        rows: state.table.len(),
        columns: state.table.schema().columns().map(|c| c.name()).collect(),
        source: state.dataset.source.clone(),
        loaded_at: state.dataset.loaded_at,
        report: state.dataset.report.clone(),
        load_error: state.dataset.load_error.clone(),
    })
}

/// GET /api/countries
pub async fn countries_handler(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    if !state.data_loaded() {
        warn!("Country data is empty. Returning empty list.");
        return Json(Vec::new());
    }
    let countries = summary::list_countries(&state.table);
    info!("Found {} countries", countries.len());
    Json(countries)
}

/// GET /api/admin1?country=
pub async fn admin1_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountryParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    info!("Request received for /api/admin1 with {:?}", params);
    let country = params.country()?;

    let units = summary::list_admin_1(&state.table, country)?;
    info!("Found {} admin1 levels for {}", units.len(), country);
    Ok(Json(units))
}

/// GET /api/admin2?country=&admin_1_name=
pub async fn admin2_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Admin2Params>,
) -> Result<Json<Vec<String>>, ApiError> {
    info!("Request received for /api/admin2 with {:?}", params);
    let (country, admin_1) = params.validate()?;

    let units = summary::list_admin_2(&state.table, country, admin_1)?;
    info!(
        "Found {} admin2 levels for {} in {}",
        units.len(),
        admin_1,
        country
    );
    Ok(Json(units))
}

/// GET /api/data?country=&admin_level=&admin_1_name=&admin_2_name=&timeseries_admin_level=&split_by_season=
pub async fn data_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataParams>,
) -> Result<Json<AreaSummary>, ApiError> {
    info!("Request received for /api/data with {:?}", params);
    let query = params.summary_query()?;

    let result = summary::area_summary(&state.table, &query)?;
    info!(
        "Processed {} level {}: {} crops, total production {}",
        query.path.country_name(),
        query.path.level().as_u8(),
        result.unique_crops_count(),
        result.total_production()
    );
    Ok(Json(result))
}

/// GET /api/crop-timeseries?country=&admin_level=&crop_name=&...
pub async fn crop_timeseries_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataParams>,
) -> Result<Json<CropTimeSeries>, ApiError> {
    info!("Request received for /api/crop-timeseries with {:?}", params);
    let query = params.crop_series_query()?;

    let result = summary::crop_time_series(&state.table, &query)?;
    info!(
        "Built {} series for {} in {}",
        result.time_series_data.len(),
        query.crop_name,
        query.path.country_name()
    );
    Ok(Json(result))
}

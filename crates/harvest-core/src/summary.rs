//! Response assembly for the query operations.
//!
//! Every operation takes the shared table by reference and returns an owned,
//! typed result. An empty table means the dataset is unavailable; only the
//! country list degrades to an empty result in that case.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{self, CropSummary, Series, SeriesOptions};
use crate::error::{NotFound, StatsError};
use crate::filter::{filter_by_path, AdminLevel, AdminPath};
use crate::table::{Column, Table};
use crate::years::YearCoverage;

// ============================================================================
// Queries
// ============================================================================

/// Parameters of the area summary, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pub path: AdminPath,
    pub series: SeriesOptions,
}

/// Parameters of the single-crop time series, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropSeriesQuery {
    pub path: AdminPath,
    pub crop_name: String,
    pub series: SeriesOptions,
}

// ============================================================================
// Responses
// ============================================================================

/// Fields shared by every summary level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropOverview {
    pub min_planting_year: Option<i32>,
    pub max_planting_year: Option<i32>,
    pub missing_planting_years: Vec<i32>,
    pub crops_summary: BTreeMap<String, CropSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalSummary {
    pub country: String,
    pub admin_level: AdminLevel,
    pub unique_crops_count: usize,
    pub total_national_production: f64,
    pub unique_admin_1_units_count: usize,
    #[serde(flatten)]
    pub overview: CropOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admin1Summary {
    pub country: String,
    pub admin_level: AdminLevel,
    pub admin_1_name: String,
    pub unique_crops_count: usize,
    pub total_admin_1_production: f64,
    pub unique_admin_2_units_count: usize,
    #[serde(flatten)]
    pub overview: CropOverview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admin2Summary {
    pub country: String,
    pub admin_level: AdminLevel,
    pub admin_1_name: String,
    pub admin_2_name: String,
    pub unique_crops_count: usize,
    pub total_admin_2_production: f64,
    #[serde(flatten)]
    pub overview: CropOverview,
}

/// Summary of one area, shaped by its admin level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AreaSummary {
    National(NationalSummary),
    Admin1(Admin1Summary),
    Admin2(Admin2Summary),
}

impl AreaSummary {
    pub fn unique_crops_count(&self) -> usize {
        match self {
            AreaSummary::National(s) => s.unique_crops_count,
            AreaSummary::Admin1(s) => s.unique_crops_count,
            AreaSummary::Admin2(s) => s.unique_crops_count,
        }
    }

    pub fn total_production(&self) -> f64 {
        match self {
            AreaSummary::National(s) => s.total_national_production,
            AreaSummary::Admin1(s) => s.total_admin_1_production,
            AreaSummary::Admin2(s) => s.total_admin_2_production,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropTimeSeries {
    pub crop_name: String,
    pub time_series_data: Vec<Series>,
}

// ============================================================================
// Operations
// ============================================================================

fn ensure_available(table: &Table) -> Result<(), StatsError> {
    if table.is_empty() {
        Err(StatsError::DataUnavailable)
    } else {
        Ok(())
    }
}

/// Sorted distinct countries; empty when no data is loaded.
pub fn list_countries(table: &Table) -> Vec<String> {
    table.distinct_text(Column::Country)
}

/// Sorted distinct admin-1 units of `country`.
pub fn list_admin_1(table: &Table, country: &str) -> Result<Vec<String>, StatsError> {
    ensure_available(table)?;
    let subset = filter_by_path(table, &AdminPath::country(country))?;
    Ok(subset.distinct_text(Column::Admin1))
}

/// Sorted distinct admin-2 units of `admin_1` in `country`.
pub fn list_admin_2(table: &Table, country: &str, admin_1: &str) -> Result<Vec<String>, StatsError> {
    ensure_available(table)?;
    let subset = filter_by_path(table, &AdminPath::admin_1(country, admin_1))?;
    Ok(subset.distinct_text(Column::Admin2))
}

/// Counts, production total, planting-year coverage and per-crop summaries
/// for the area named by `query.path`.
pub fn area_summary(table: &Table, query: &SummaryQuery) -> Result<AreaSummary, StatsError> {
    ensure_available(table)?;
    let area = filter_by_path(table, &query.path)?;

    let country = query.path.country_name().to_string();
    let admin_level = query.path.level();
    let unique_crops_count = area.count_distinct(Column::Product);
    let total_production = area.sum(Column::Production);
    let overview = crop_overview(&area, query.series);

    let summary = match &query.path {
        AdminPath::Country { .. } => AreaSummary::National(NationalSummary {
            country,
            admin_level,
            unique_crops_count,
            total_national_production: total_production,
            unique_admin_1_units_count: area.count_distinct(Column::Admin1),
            overview,
        }),
        AdminPath::Admin1 { admin_1, .. } => AreaSummary::Admin1(Admin1Summary {
            country,
            admin_level,
            admin_1_name: admin_1.clone(),
            unique_crops_count,
            total_admin_1_production: total_production,
            unique_admin_2_units_count: area.count_distinct(Column::Admin2),
            overview,
        }),
        AdminPath::Admin2 {
            admin_1, admin_2, ..
        } => AreaSummary::Admin2(Admin2Summary {
            country,
            admin_level,
            admin_1_name: admin_1.clone(),
            admin_2_name: admin_2.clone(),
            unique_crops_count,
            total_admin_2_production: total_production,
            overview,
        }),
    };

    Ok(summary)
}

fn crop_overview(area: &Table, series: SeriesOptions) -> CropOverview {
    let planting = YearCoverage::from_years(area.years(Column::PlantingYear).unwrap_or_default());

    let crops_summary = area
        .group_by(&[Column::Product])
        .into_iter()
        .map(|(key, crop)| {
            let name = key.into_iter().map(|v| v.to_string()).collect::<String>();
            (name, aggregate::summarize(&crop, series))
        })
        .collect();

    CropOverview {
        min_planting_year: planting.min,
        max_planting_year: planting.max,
        missing_planting_years: planting.missing,
        crops_summary,
    }
}

/// Time series of one crop within the area named by `query.path`.
pub fn crop_time_series(
    table: &Table,
    query: &CropSeriesQuery,
) -> Result<CropTimeSeries, StatsError> {
    ensure_available(table)?;
    let area = filter_by_path(table, &query.path)?;

    let crop = area.filter(|r| r.product.as_deref() == Some(query.crop_name.as_str()));
    if crop.is_empty() {
        return Err(NotFound::Crop {
            crop: query.crop_name.clone(),
        }
        .into());
    }

    Ok(CropTimeSeries {
        crop_name: query.crop_name.clone(),
        time_series_data: aggregate::time_series(&crop, query.series),
    })
}

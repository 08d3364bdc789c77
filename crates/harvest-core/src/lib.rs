//! Aggregation engine for HVStat crop statistics.
//!
//! The dataset is loaded once into an immutable [`Table`]; every query filters
//! it along the country → admin-1 → admin-2 hierarchy and aggregates the
//! result per crop, season and harvest year.
//!
//! - [`loader`]: CSV ingestion with numeric coercion
//! - [`table`]: typed records, schema and the query surface
//! - [`filter`]: hierarchical filtering
//! - [`years`]: year range and gap analysis
//! - [`aggregate`]: per-crop totals, time series and season breakdown
//! - [`summary`]: response assembly for the query operations

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod summary;
pub mod table;
pub mod years;

pub use aggregate::{CropSummary, SeasonBreakdown, Series, SeriesOptions, TimePoint};
pub use error::{LoadError, NotFound, StatsError};
pub use filter::{filter_by_path, AdminLevel, AdminPath};
pub use loader::{load_path, load_reader, load_str, LoadReport};
pub use summary::{
    area_summary, crop_time_series, list_admin_1, list_admin_2, list_countries, AreaSummary,
    CropSeriesQuery, CropTimeSeries, SummaryQuery,
};
pub use table::{Column, Record, Schema, Table, Value};
pub use years::{missing_years, YearCoverage};

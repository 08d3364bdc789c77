//! Error types for dataset loading and query evaluation.

use std::path::PathBuf;
use thiserror::Error;

/// Query failures, mapped 1:1 to caller-visible responses.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    /// Missing or malformed request parameter.
    #[error("{0}")]
    Validation(String),

    /// Well-formed query with no matching rows at the requested level.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// The dataset failed to load or holds no rows.
    #[error("Data not loaded or CSV processing failed on server.")]
    DataUnavailable,
}

impl StatsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StatsError::Validation(msg.into())
    }
}

/// The hierarchy level (or crop) that failed to match, with its identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("No data found for country: {country}")]
    Country { country: String },

    #[error("No data found for Admin 1: {admin_1} in {country}")]
    Admin1 { country: String, admin_1: String },

    #[error("No data found for Admin 2: {admin_2} in Admin 1: {admin_1}, Country: {country}")]
    Admin2 {
        country: String,
        admin_1: String,
        admin_2: String,
    },

    #[error("No data found for crop: {crop}")]
    Crop { crop: String },
}

/// Dataset load failures. These never escape startup: the service logs them
/// and continues with an empty table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV header: {0}")]
    Header(#[from] csv::Error),

    #[error("dataset has no header row")]
    MissingHeader,

    #[error("dataset contains no data rows")]
    NoRows,
}

//! Shared application state: the dataset, loaded once at startup.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use harvest_core::{load_path, LoadReport, Table};
use tracing::{error, info};

/// Provenance of the loaded dataset, reported by `/health`.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub report: Option<LoadReport>,
    pub load_error: Option<String>,
}

/// Read-only state shared by every handler.
pub struct AppState {
    pub table: Arc<Table>,
    pub dataset: DatasetInfo,
}

impl AppState {
    /// Load the dataset at `path`. A failed load is logged and leaves the
    /// service running on an empty table.
    pub fn load(path: &Path) -> Self {
        let source = path.display().to_string();
        match load_path(path) {
            Ok((table, report)) => {
                info!(
                    "CSV data loaded and processed successfully: {} rows from {}",
                    table.len(),
                    source
                );
                let mut state = Self::from_table(table).with_report(report);
                state.dataset.source = source;
                state
            }
            Err(e) => {
                error!("Dataset could not be loaded, serving without data: {}", e);
                Self {
                    table: Arc::new(Table::empty()),
                    dataset: DatasetInfo {
                        source,
                        loaded_at: Utc::now(),
                        report: None,
                        load_error: Some(e.to_string()),
                    },
                }
            }
        }
    }

    /// Wrap an already built table.
    pub fn from_table(table: Table) -> Self {
        Self {
            table: Arc::new(table),
            dataset: DatasetInfo {
                source: "memory".to_string(),
                loaded_at: Utc::now(),
                report: None,
                load_error: None,
            },
        }
    }

    /// Attach the diagnostics of the load that produced the table.
    pub fn with_report(mut self, report: LoadReport) -> Self {
        self.dataset.report = Some(report);
        self
    }

    pub fn data_loaded(&self) -> bool {
        !self.table.is_empty()
    }
}

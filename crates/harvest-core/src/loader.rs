//! CSV ingestion into a [`Table`].
//!
//! Headers are matched against the known [`Column`] set; unknown headers are
//! kept in the schema for diagnostics only. Numeric cells that do not parse are
//! coerced to null and counted in the [`LoadReport`], never treated as errors.

use std::fs::File;
use std::io::Read;
use std::ops::RangeInclusive;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::table::{Column, Record, Schema, Table, Value};

/// Markers read as null, mirroring the defaults of common CSV tooling.
const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "-1.#IND", "1.#IND", "-1.#QNAN", "1.#QNAN",
];

/// Years outside this range are read as null and counted as coerced.
const PLAUSIBLE_YEARS: RangeInclusive<i32> = 1000..=9999;

/// What happened while reading the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub coerced_cells: usize,
}

/// Load the CSV file at `path`.
pub fn load_path(path: impl AsRef<Path>) -> Result<(Table, LoadReport), LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Reading dataset from {}", path.display());
    load_reader(file)
}

/// Load CSV text already held in memory.
pub fn load_str(content: &str) -> Result<(Table, LoadReport), LoadError> {
    load_reader(content.as_bytes())
}

/// Load CSV from any reader. The first row must be the header.
pub fn load_reader<R: Read>(reader: R) -> Result<(Table, LoadReport), LoadError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            // Strip a UTF-8 BOM from the first header if the reader left it in place
            if i == 0 {
                h.trim_start_matches('\u{feff}').trim().to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::MissingHeader);
    }

    // Position -> column; only the first occurrence of a duplicated header is used
    let mut mapping: Vec<Option<Column>> = Vec::with_capacity(headers.len());
    for header in &headers {
        let column = Column::from_header(header).filter(|c| !mapping.contains(&Some(*c)));
        mapping.push(column);
    }

    let schema = Schema::from_headers(headers);
    debug!(
        "Detected columns: {:?}",
        schema.columns().map(Column::name).collect::<Vec<_>>()
    );

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (line_idx, result) in reader.records().enumerate() {
        report.rows_read += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                // +2 for 1-indexed lines plus the header
                warn!("Skipping line {} due to error: {}", line_idx + 2, e);
                report.rows_skipped += 1;
                continue;
            }
        };
        records.push(parse_record(&row, &mapping, &mut report));
    }

    if records.is_empty() {
        return Err(LoadError::NoRows);
    }

    if report.rows_skipped > 0 || report.coerced_cells > 0 {
        warn!(
            "Dataset loaded with {} skipped rows and {} numeric cells coerced to null",
            report.rows_skipped, report.coerced_cells
        );
    }
    info!(
        "Loaded {} rows with {} known columns",
        records.len(),
        schema.columns().count()
    );

    Ok((Table::new(schema, records), report))
}

fn parse_record(row: &StringRecord, mapping: &[Option<Column>], report: &mut LoadReport) -> Record {
    let mut record = Record::default();

    for (raw, column) in row.iter().zip(mapping) {
        let Some(column) = column else { continue };
        if is_null(raw) {
            continue;
        }

        match column {
            Column::Country => record.country = Some(raw.to_string()),
            Column::Admin1 => record.admin_1 = Some(raw.to_string()),
            Column::Admin2 => record.admin_2 = Some(raw.to_string()),
            Column::Product => record.product = Some(raw.to_string()),
            Column::SeasonName => record.season_name = Some(raw.to_string()),
            Column::CropProductionSystem => record.crop_production_system = Some(raw.to_string()),
            Column::PlantingYear => record.planting_year = coerce(parse_year(raw), report),
            Column::HarvestYear => record.harvest_year = coerce(parse_year(raw), report),
            Column::PlantingMonth => record.planting_month = Some(parse_month(raw)),
            Column::HarvestMonth => record.harvest_month = Some(parse_month(raw)),
            Column::Area => record.area = coerce(parse_number(raw), report),
            Column::Production => record.production = coerce(parse_number(raw), report),
        }
    }

    record
}

fn coerce<T>(parsed: Option<T>, report: &mut LoadReport) -> Option<T> {
    if parsed.is_none() {
        report.coerced_cells += 1;
    }
    parsed
}

fn is_null(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Years may be written as floats ("2019.0"); the fractional part is truncated.
fn parse_year(raw: &str) -> Option<i32> {
    let year = parse_number(raw)
        .filter(|v| *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
        .map(|v| v.trunc() as i32)?;
    if !PLAUSIBLE_YEARS.contains(&year) {
        debug!("Implausible year {} read as null", year);
        return None;
    }
    Some(year)
}

/// Integer-like months become integers; anything else stays text.
fn parse_month(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Int(v);
    }
    match parse_number(raw) {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Value::Int(v as i64),
        _ => Value::Text(raw.to_string()),
    }
}

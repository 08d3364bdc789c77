//! Inspect - Diagnostic report for an HVStat CSV dataset
//!
//! Loads the dataset exactly as the API does and prints what was found:
//! - row counts and the load report
//! - detected and unrecognised columns
//! - countries, and optionally the units, crops and planting years of one country
//!
//! Usage:
//!   cargo run --bin inspect -- --data data/hvstat_africa_data_v1.0.csv
//!   cargo run --bin inspect -- --data data/hvstat_africa_data_v1.0.csv --country Kenya

use anyhow::{Context, Result};
use clap::Parser;
use harvest_core::{filter_by_path, load_path, AdminPath, Column, LoadReport, Table, YearCoverage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inspect", about = "Prints a diagnostic report for an HVStat CSV dataset")]
struct Args {
    /// Path to the CSV dataset
    #[arg(long, env = "HVSTAT_DATA_PATH")]
    data: PathBuf,

    /// Country to break down by admin units and crops
    #[arg(long)]
    country: Option<String>,

    /// Maximum number of values listed per section
    #[arg(long, default_value = "20")]
    limit: usize,
}

fn print_list(title: &str, values: &[String], limit: usize) {
    println!("{} ({}):", title, values.len());
    for value in values.iter().take(limit) {
        println!("  {}", value);
    }
    if values.len() > limit {
        println!("  ... and {} more", values.len() - limit);
    }
}

fn print_schema(table: &Table) {
    let known: Vec<&str> = table.schema().columns().map(Column::name).collect();
    println!("\nDetected columns ({}): {:?}", known.len(), known);

    let missing: Vec<&str> = Column::ALL
        .into_iter()
        .filter(|c| !table.has_column(*c))
        .map(Column::name)
        .collect();
    if !missing.is_empty() {
        println!("Missing columns: {:?}", missing);
    }

    let unknown = table.schema().unknown_headers();
    if !unknown.is_empty() {
        println!("Ignored columns: {:?}", unknown);
    }
}

fn print_report(table: &Table, report: &LoadReport) {
    println!("Rows loaded: {}", table.len());
    println!("Rows read:   {}", report.rows_read);
    println!("Skipped:     {}", report.rows_skipped);
    println!("Coerced numeric cells: {}", report.coerced_cells);
}

fn print_coverage(label: &str, coverage: &YearCoverage) {
    match (coverage.min, coverage.max) {
        (Some(min), Some(max)) => {
            println!("{}: {}-{}", label, min, max);
            if !coverage.missing.is_empty() {
                println!("  Missing: {:?}", coverage.missing);
            }
        }
        _ => println!("{}: none", label),
    }
}

fn print_country(table: &Table, country: &str, limit: usize) -> Result<()> {
    let subset = filter_by_path(table, &AdminPath::country(country))?;

    println!("\n=== {} ===", country);
    println!("Rows: {}", subset.len());
    println!(
        "Total production: {:.1} t, area: {:.1} ha",
        subset.sum(Column::Production),
        subset.sum(Column::Area)
    );
    print_list("Admin 1 units", &subset.distinct_text(Column::Admin1), limit);
    print_list("Crops", &subset.distinct_text(Column::Product), limit);
    print_list("Seasons", &subset.distinct_text(Column::SeasonName), limit);

    let planting = YearCoverage::from_years(subset.years(Column::PlantingYear).unwrap_or_default());
    let harvest = YearCoverage::from_years(subset.years(Column::HarvestYear).unwrap_or_default());
    print_coverage("Planting years", &planting);
    print_coverage("Harvest years", &harvest);

    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("=== HVStat Dataset Inspection ===");
    println!("Source: {}", args.data.display());

    let (table, report) = load_path(&args.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;

    print_report(&table, &report);
    print_schema(&table);

    if !table.has_column(Column::Country) {
        println!("\nNo 'country' column found!");
        return Ok(());
    }

    println!();
    print_list("Countries", &table.distinct_text(Column::Country), args.limit);

    if let Some(country) = &args.country {
        print_country(&table, country, args.limit)?;
    }

    println!("\n=== Inspection Complete ===");
    Ok(())
}

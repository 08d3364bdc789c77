//! Per-crop aggregation: totals, yearly time series and season breakdown.
//!
//! All functions take a crop subset by reference and build new values; the
//! input table is never modified. Division is always guarded: a zero (or
//! negative) denominator yields 0.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::filter::AdminLevel;
use crate::table::{Column, Record, Table, Value};

/// Label of the single aggregated series.
pub const TOTAL_LABEL: &str = "Total";

/// Production system label used in composite keys when the system is null.
pub const UNKNOWN_SYSTEM_LABEL: &str = "Unknown";

// ============================================================================
// Metrics
// ============================================================================

/// Summed production (tonnes) and area (hectares), nulls counted as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub production: f64,
    pub area: f64,
}

impl Totals {
    pub fn of(table: &Table) -> Self {
        let mut totals = Totals::default();
        for record in table.records() {
            totals.add(record);
        }
        totals
    }

    fn add(&mut self, record: &Record) {
        self.production += record.production.unwrap_or(0.0);
        self.area += record.area.unwrap_or(0.0);
    }

    pub fn yield_per_area(&self) -> f64 {
        ratio(self.production, self.area)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

// ============================================================================
// Output types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub year: i32,
    pub production: f64,
    pub area: f64,
    #[serde(rename = "yield")]
    pub yield_value: f64,
}

impl TimePoint {
    fn new(year: i32, totals: Totals) -> Self {
        Self {
            year,
            production: totals.production,
            area: totals.area,
            yield_value: totals.yield_per_area(),
        }
    }
}

/// One named, year-ordered sequence of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub admin_unit: String,
    pub data: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonBreakdown {
    pub season_name: String,
    pub production_absolute: f64,
    pub production_percentage_of_crop: f64,
    pub area_harvested: f64,
    #[serde(rename = "yield")]
    pub yield_value: f64,
    pub production_systems: Vec<String>,
    pub planting_months: Vec<Value>,
    pub harvest_months: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropSummary {
    pub total_production: f64,
    pub total_area_harvested: f64,
    pub average_yield: f64,
    pub time_series_data: Vec<Series>,
    pub season_specific_breakdown: Vec<SeasonBreakdown>,
}

/// How the time series of a crop is broken out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesOptions {
    /// 0: national, 1: one series per admin-1 unit, 2: one per admin-2 unit.
    pub admin_level: AdminLevel,
    /// At national level, one series per season × production system.
    pub split_by_season: bool,
}

// ============================================================================
// Aggregation
// ============================================================================

/// Totals, time series and season breakdown for one crop subset.
pub fn summarize(crop: &Table, options: SeriesOptions) -> CropSummary {
    let totals = Totals::of(crop);
    CropSummary {
        total_production: totals.production,
        total_area_harvested: totals.area,
        average_yield: totals.yield_per_area(),
        time_series_data: time_series(crop, options),
        season_specific_breakdown: season_breakdown(crop, totals.production),
    }
}

/// Yearly series for `crop`; empty when there is no `harvest_year` column.
pub fn time_series(crop: &Table, options: SeriesOptions) -> Vec<Series> {
    if !crop.has_column(Column::HarvestYear) {
        return Vec::new();
    }

    match options.admin_level {
        AdminLevel::National if options.split_by_season => season_system_series(crop),
        AdminLevel::National => vec![total_series(crop)],
        level => match level.column() {
            Some(column) if crop.has_column(column) => {
                keyed_series(crop.records(), |r| r.text(column).map(str::to_string), |k| k)
            }
            _ => Vec::new(),
        },
    }
}

fn total_series(crop: &Table) -> Series {
    let mut years = YearlyTotals::new();
    for record in crop.records() {
        years.add(record);
    }
    Series {
        admin_unit: TOTAL_LABEL.to_string(),
        data: years.into_points(),
    }
}

/// One series per season × production system, or per whichever of the two
/// columns exists.
///
/// With both columns, a null season drops the row and a null production
/// system is labelled "Unknown". With one column, a null drops the row.
fn season_system_series(crop: &Table) -> Vec<Series> {
    let has_season = crop.has_column(Column::SeasonName);
    let has_system = crop.has_column(Column::CropProductionSystem);

    match (has_season, has_system) {
        (true, true) => keyed_series(
            crop.records(),
            |r| {
                let season = r.season_name.clone()?;
                let system = r
                    .crop_production_system
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_SYSTEM_LABEL.to_string());
                Some((season, system))
            },
            |(season, system)| format!("{} - {}", season, system),
        ),
        (true, false) => keyed_series(
            crop.records(),
            |r| r.season_name.clone(),
            |season| season,
        ),
        (false, true) => keyed_series(
            crop.records(),
            |r| r.crop_production_system.clone(),
            |system| system,
        ),
        (false, false) => vec![total_series(crop)],
    }
}

/// Group records by `key`, sub-group by harvest year, and label each group.
///
/// Groups are ordered by key. Rows with a null key or null year contribute
/// nothing, and groups left without points are omitted.
fn keyed_series<K, F, L>(records: &[Record], key: F, label: L) -> Vec<Series>
where
    K: Ord,
    F: Fn(&Record) -> Option<K>,
    L: Fn(K) -> String,
{
    let mut groups: BTreeMap<K, YearlyTotals> = BTreeMap::new();
    for record in records {
        if record.harvest_year.is_none() {
            continue;
        }
        if let Some(k) = key(record) {
            groups.entry(k).or_default().add(record);
        }
    }

    groups
        .into_iter()
        .map(|(k, years)| Series {
            admin_unit: label(k),
            data: years.into_points(),
        })
        .filter(|s| !s.data.is_empty())
        .collect()
}

#[derive(Debug, Default)]
struct YearlyTotals(BTreeMap<i32, Totals>);

impl YearlyTotals {
    fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, record: &Record) {
        if let Some(year) = record.harvest_year {
            self.0.entry(year).or_default().add(record);
        }
    }

    fn into_points(self) -> Vec<TimePoint> {
        self.0
            .into_iter()
            .map(|(year, totals)| TimePoint::new(year, totals))
            .collect()
    }
}

/// One entry per non-null season, ordered by season name.
pub fn season_breakdown(crop: &Table, crop_production: f64) -> Vec<SeasonBreakdown> {
    crop.group_by(&[Column::SeasonName])
        .into_iter()
        .map(|(key, season)| {
            let totals = Totals::of(&season);
            let percentage = if crop_production != 0.0 {
                totals.production / crop_production * 100.0
            } else {
                0.0
            };

            SeasonBreakdown {
                season_name: key.into_iter().map(|v| v.to_string()).collect(),
                production_absolute: totals.production,
                production_percentage_of_crop: percentage,
                area_harvested: totals.area,
                yield_value: totals.yield_per_area(),
                production_systems: production_systems(&season),
                planting_months: season.distinct_nonnull(Column::PlantingMonth),
                harvest_months: season.distinct_nonnull(Column::HarvestMonth),
            }
        })
        .collect()
}

/// Distinct non-null production systems in first-seen order.
fn production_systems(season: &Table) -> Vec<String> {
    let mut systems: Vec<String> = Vec::new();
    if !season.has_column(Column::CropProductionSystem) {
        return systems;
    }
    for system in season
        .records()
        .iter()
        .filter_map(|r| r.crop_production_system.as_deref())
    {
        if !systems.iter().any(|s| s == system) {
            systems.push(system.to_string());
        }
    }
    systems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Schema;
    use approx::assert_relative_eq;

    struct Row {
        admin_1: Option<&'static str>,
        admin_2: Option<&'static str>,
        season: Option<&'static str>,
        system: Option<&'static str>,
        year: Option<i32>,
        production: Option<f64>,
        area: Option<f64>,
    }

    fn row(year: Option<i32>, production: Option<f64>, area: Option<f64>) -> Row {
        Row {
            admin_1: None,
            admin_2: None,
            season: None,
            system: None,
            year,
            production,
            area,
        }
    }

    fn build(columns: &[Column], rows: Vec<Row>) -> Table {
        let records = rows
            .into_iter()
            .map(|r| Record {
                country: Some("Kenya".to_string()),
                product: Some("Maize".to_string()),
                admin_1: r.admin_1.map(str::to_string),
                admin_2: r.admin_2.map(str::to_string),
                season_name: r.season.map(str::to_string),
                crop_production_system: r.system.map(str::to_string),
                harvest_year: r.year,
                production: r.production,
                area: r.area,
                ..Default::default()
            })
            .collect();
        let mut all = vec![
            Column::Country,
            Column::Product,
            Column::HarvestYear,
            Column::Production,
            Column::Area,
        ];
        all.extend_from_slice(columns);
        Table::new(Schema::with_columns(all), records)
    }

    fn national(split_by_season: bool) -> SeriesOptions {
        SeriesOptions {
            admin_level: AdminLevel::National,
            split_by_season,
        }
    }

    #[test]
    fn test_yield_guards_zero_area() {
        let crop = build(&[], vec![row(Some(2020), Some(10.0), None)]);
        let summary = summarize(&crop, SeriesOptions::default());
        assert_eq!(summary.total_production, 10.0);
        assert_eq!(summary.total_area_harvested, 0.0);
        assert_eq!(summary.average_yield, 0.0);
        assert_eq!(summary.time_series_data[0].data[0].yield_value, 0.0);
    }

    #[test]
    fn test_yield_is_production_over_area() {
        let crop = build(
            &[],
            vec![
                row(Some(2020), Some(100.0), Some(50.0)),
                row(Some(2021), Some(200.0), Some(100.0)),
            ],
        );
        let summary = summarize(&crop, SeriesOptions::default());
        assert_relative_eq!(summary.average_yield, 2.0);
    }

    #[test]
    fn test_same_year_rows_are_summed() {
        let crop = build(
            &[],
            vec![
                row(Some(2020), Some(10.0), Some(5.0)),
                row(Some(2020), Some(5.0), Some(5.0)),
            ],
        );
        let series = time_series(&crop, SeriesOptions::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].admin_unit, TOTAL_LABEL);
        assert_eq!(
            series[0].data,
            vec![TimePoint {
                year: 2020,
                production: 15.0,
                area: 10.0,
                yield_value: 1.5
            }]
        );
    }

    #[test]
    fn test_points_sorted_and_null_years_dropped() {
        let crop = build(
            &[],
            vec![
                row(Some(2022), Some(1.0), Some(1.0)),
                row(None, Some(99.0), Some(1.0)),
                row(Some(2019), Some(2.0), Some(1.0)),
                row(Some(2021), None, None),
            ],
        );
        let series = time_series(&crop, SeriesOptions::default());
        let years: Vec<i32> = series[0].data.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2019, 2021, 2022]);
        assert_eq!(series[0].data[1].production, 0.0);
    }

    #[test]
    fn test_no_harvest_year_column_gives_no_series() {
        let mut crop = build(&[], vec![row(Some(2020), Some(1.0), Some(1.0))]);
        crop = Table::new(
            Schema::with_columns([Column::Country, Column::Production]),
            crop.records().to_vec(),
        );
        assert!(time_series(&crop, SeriesOptions::default()).is_empty());
    }

    #[test]
    fn test_admin_1_series() {
        let mut a = row(Some(2020), Some(4.0), Some(2.0));
        a.admin_1 = Some("Rift Valley");
        let mut b = row(Some(2020), Some(3.0), Some(1.0));
        b.admin_1 = Some("Coast");
        let mut c = row(None, Some(3.0), Some(1.0));
        c.admin_1 = Some("Nyanza");
        let d = row(Some(2021), Some(1.0), Some(1.0));

        let crop = build(&[Column::Admin1], vec![a, b, c, d]);
        let options = SeriesOptions {
            admin_level: AdminLevel::Admin1,
            split_by_season: false,
        };
        let series = time_series(&crop, options);
        let labels: Vec<&str> = series.iter().map(|s| s.admin_unit.as_str()).collect();
        // Nyanza has no valid year, the unnamed row has no admin unit
        assert_eq!(labels, vec!["Coast", "Rift Valley"]);
        assert_relative_eq!(series[1].data[0].yield_value, 2.0);
    }

    #[test]
    fn test_admin_2_series() {
        let mut a = row(Some(2020), Some(6.0), Some(3.0));
        a.admin_2 = Some("Nakuru");
        let mut b = row(Some(2019), Some(1.0), Some(1.0));
        b.admin_2 = Some("Baringo");
        let mut c = row(Some(2020), Some(2.0), Some(0.0));
        c.admin_2 = Some("Nakuru");
        let d = row(Some(2020), Some(9.0), Some(9.0));

        let crop = build(&[Column::Admin1, Column::Admin2], vec![a, b, c, d]);
        let options = SeriesOptions {
            admin_level: AdminLevel::Admin2,
            split_by_season: false,
        };
        let series = time_series(&crop, options);
        let labels: Vec<&str> = series.iter().map(|s| s.admin_unit.as_str()).collect();
        assert_eq!(labels, vec!["Baringo", "Nakuru"]);

        let nakuru = &series[1].data;
        assert_eq!(nakuru.len(), 1);
        assert_eq!(nakuru[0].year, 2020);
        assert_relative_eq!(nakuru[0].production, 8.0);
        assert_relative_eq!(nakuru[0].area, 3.0);
    }

    #[test]
    fn test_admin_series_without_column_is_empty() {
        let crop = build(&[], vec![row(Some(2020), Some(1.0), Some(1.0))]);
        let options = SeriesOptions {
            admin_level: AdminLevel::Admin2,
            split_by_season: true,
        };
        assert!(time_series(&crop, options).is_empty());
    }

    #[test]
    fn test_split_with_season_only() {
        let mut a = row(Some(2020), Some(1.0), Some(1.0));
        a.season = Some("Long");
        let mut b = row(Some(2021), Some(2.0), Some(1.0));
        b.season = Some("Short");
        let mut c = row(Some(2021), Some(3.0), Some(1.0));
        c.season = Some("Long");

        let crop = build(&[Column::SeasonName], vec![a, b, c]);
        let series = time_series(&crop, national(true));
        let labels: Vec<&str> = series.iter().map(|s| s.admin_unit.as_str()).collect();
        assert_eq!(labels, vec!["Long", "Short"]);
        assert_eq!(series[0].data.len(), 2);
    }

    #[test]
    fn test_split_with_system_only() {
        let mut a = row(Some(2020), Some(1.0), Some(1.0));
        a.system = Some("rainfed");
        let b = row(Some(2020), Some(5.0), Some(1.0));
        let mut c = row(Some(2021), Some(4.0), Some(2.0));
        c.system = Some("irrigated");

        let crop = build(&[Column::CropProductionSystem], vec![a, b, c]);
        let series = time_series(&crop, national(true));
        let labels: Vec<&str> = series.iter().map(|s| s.admin_unit.as_str()).collect();
        // The row without a system belongs to no series
        assert_eq!(labels, vec!["irrigated", "rainfed"]);
        assert_relative_eq!(series[0].data[0].yield_value, 2.0);
        assert_relative_eq!(series[1].data[0].production, 1.0);
    }

    #[test]
    fn test_split_with_season_and_system() {
        let mut a = row(Some(2020), Some(1.0), Some(1.0));
        a.season = Some("Long");
        a.system = Some("rainfed");
        let mut b = row(Some(2020), Some(2.0), Some(1.0));
        b.season = Some("Long");
        let mut c = row(Some(2020), Some(3.0), Some(1.0));
        c.system = Some("irrigated");

        let crop = build(
            &[Column::SeasonName, Column::CropProductionSystem],
            vec![a, b, c],
        );
        let series = time_series(&crop, national(true));
        let labels: Vec<&str> = series.iter().map(|s| s.admin_unit.as_str()).collect();
        assert_eq!(labels, vec!["Long - Unknown", "Long - rainfed"]);
    }

    #[test]
    fn test_split_without_grouping_columns_falls_back_to_total() {
        let crop = build(&[], vec![row(Some(2020), Some(1.0), Some(1.0))]);
        let series = time_series(&crop, national(true));
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].admin_unit, TOTAL_LABEL);
    }

    #[test]
    fn test_season_percentages_sum_to_100() {
        let mut a = row(Some(2020), Some(30.0), Some(10.0));
        a.season = Some("Long");
        let mut b = row(Some(2020), Some(10.0), Some(10.0));
        b.season = Some("Short");
        let mut c = row(Some(2021), Some(60.0), Some(20.0));
        c.season = Some("Long");

        let crop = build(&[Column::SeasonName], vec![a, b, c]);
        let summary = summarize(&crop, SeriesOptions::default());
        let seasons = &summary.season_specific_breakdown;
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[0].season_name, "Long");
        assert_relative_eq!(seasons[0].production_percentage_of_crop, 90.0);
        assert_relative_eq!(seasons[0].yield_value, 3.0);
        let total: f64 = seasons.iter().map(|s| s.production_percentage_of_crop).sum();
        assert_relative_eq!(total, 100.0, epsilon = 1e-9);
        // Columns absent from the source give empty lists
        assert!(seasons[0].production_systems.is_empty());
        assert!(seasons[0].planting_months.is_empty());
    }

    #[test]
    fn test_season_percentages_zero_without_production() {
        let mut a = row(Some(2020), None, Some(10.0));
        a.season = Some("Long");
        let mut b = row(Some(2020), Some(0.0), Some(10.0));
        b.season = Some("Short");

        let crop = build(&[Column::SeasonName], vec![a, b]);
        let summary = summarize(&crop, SeriesOptions::default());
        assert!(summary
            .season_specific_breakdown
            .iter()
            .all(|s| s.production_percentage_of_crop == 0.0));
    }

    #[test]
    fn test_season_production_systems_and_months() {
        let records = vec![
            Record {
                season_name: Some("Main".to_string()),
                crop_production_system: Some("rainfed".to_string()),
                planting_month: Some(Value::Int(11)),
                harvest_month: Some(Value::Int(3)),
                ..Default::default()
            },
            Record {
                season_name: Some("Main".to_string()),
                crop_production_system: Some("irrigated".to_string()),
                planting_month: Some(Value::Int(2)),
                ..Default::default()
            },
            Record {
                season_name: Some("Main".to_string()),
                crop_production_system: Some("rainfed".to_string()),
                ..Default::default()
            },
        ];
        let crop = Table::new(
            Schema::with_columns([
                Column::SeasonName,
                Column::CropProductionSystem,
                Column::PlantingMonth,
                Column::HarvestMonth,
            ]),
            records,
        );
        let seasons = season_breakdown(&crop, 0.0);
        assert_eq!(seasons[0].production_systems, vec!["rainfed", "irrigated"]);
        assert_eq!(seasons[0].planting_months, vec![Value::Int(2), Value::Int(11)]);
        assert_eq!(seasons[0].harvest_months, vec![Value::Int(3)]);
    }

    #[test]
    fn test_crop_summary_serializes_contract_fields() {
        let crop = build(&[], vec![row(Some(2020), Some(4.0), Some(2.0))]);
        let json = serde_json::to_value(summarize(&crop, SeriesOptions::default())).unwrap();
        assert_eq!(json["total_area_harvested"], 2.0);
        assert_eq!(json["time_series_data"][0]["admin_unit"], "Total");
        assert_eq!(json["time_series_data"][0]["data"][0]["yield"], 2.0);
        assert!(json["season_specific_breakdown"].as_array().unwrap().is_empty());
    }
}

//! In-memory tabular store for the HVStat dataset.
//!
//! A [`Table`] is built once from the CSV source and never mutated afterwards.
//! Every query (`filter`, `group_by`, ...) returns a new derived value.
//!
//! Column presence is tracked by the [`Schema`]: accessors return `None` when a
//! column does not exist in the source at all, which is distinct from a column
//! that exists but holds nulls.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Columns
// ============================================================================

/// Known dataset columns. Any other header in the source is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Country,
    Admin1,
    Admin2,
    Product,
    SeasonName,
    CropProductionSystem,
    PlantingYear,
    HarvestYear,
    PlantingMonth,
    HarvestMonth,
    Area,
    Production,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Country,
        Column::Admin1,
        Column::Admin2,
        Column::Product,
        Column::SeasonName,
        Column::CropProductionSystem,
        Column::PlantingYear,
        Column::HarvestYear,
        Column::PlantingMonth,
        Column::HarvestMonth,
        Column::Area,
        Column::Production,
    ];

    /// Header name as it appears in the CSV source.
    pub fn name(self) -> &'static str {
        match self {
            Column::Country => "country",
            Column::Admin1 => "admin_1",
            Column::Admin2 => "admin_2",
            Column::Product => "product",
            Column::SeasonName => "season_name",
            Column::CropProductionSystem => "crop_production_system",
            Column::PlantingYear => "planting_year",
            Column::HarvestYear => "harvest_year",
            Column::PlantingMonth => "planting_month",
            Column::HarvestMonth => "harvest_month",
            Column::Area => "area",
            Column::Production => "production",
        }
    }

    /// Match a header exactly (after trimming) against the known columns.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.into_iter().find(|c| c.name() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Values
// ============================================================================

/// A groupable cell value. Integers order before text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

// ============================================================================
// Records
// ============================================================================

/// One row of the dataset. Every field is nullable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub country: Option<String>,
    pub admin_1: Option<String>,
    pub admin_2: Option<String>,
    pub product: Option<String>,
    pub season_name: Option<String>,
    pub crop_production_system: Option<String>,
    pub planting_year: Option<i32>,
    pub harvest_year: Option<i32>,
    pub planting_month: Option<Value>,
    pub harvest_month: Option<Value>,
    pub area: Option<f64>,
    pub production: Option<f64>,
}

impl Record {
    /// Categorical text for `column`; `None` for null cells and non-text columns.
    pub fn text(&self, column: Column) -> Option<&str> {
        let cell = match column {
            Column::Country => &self.country,
            Column::Admin1 => &self.admin_1,
            Column::Admin2 => &self.admin_2,
            Column::Product => &self.product,
            Column::SeasonName => &self.season_name,
            Column::CropProductionSystem => &self.crop_production_system,
            _ => return None,
        };
        cell.as_deref()
    }

    /// Groupable value for `column`. Measures (area, production) are not groupable.
    pub fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::PlantingYear => self.planting_year.map(|y| Value::Int(y.into())),
            Column::HarvestYear => self.harvest_year.map(|y| Value::Int(y.into())),
            Column::PlantingMonth => self.planting_month.clone(),
            Column::HarvestMonth => self.harvest_month.clone(),
            Column::Area | Column::Production => None,
            _ => self.text(column).map(Value::from),
        }
    }

    pub fn year(&self, column: Column) -> Option<i32> {
        match column {
            Column::PlantingYear => self.planting_year,
            Column::HarvestYear => self.harvest_year,
            _ => None,
        }
    }

    pub fn measure(&self, column: Column) -> Option<f64> {
        match column {
            Column::Area => self.area,
            Column::Production => self.production,
            _ => None,
        }
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Which known columns exist in the source, plus the raw header list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: BTreeSet<Column>,
    headers: Vec<String>,
}

impl Schema {
    pub fn from_headers(headers: Vec<String>) -> Self {
        let columns = headers
            .iter()
            .filter_map(|h| Column::from_header(h))
            .collect();
        Self { columns, headers }
    }

    pub fn with_columns(columns: impl IntoIterator<Item = Column>) -> Self {
        let columns: BTreeSet<Column> = columns.into_iter().collect();
        let headers = columns.iter().map(|c| c.name().to_string()).collect();
        Self { columns, headers }
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    /// Headers present in the source that do not map to a known column.
    pub fn unknown_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| Column::from_header(h).is_none())
            .map(String::as_str)
            .collect()
    }
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Table {
    schema: Schema,
    records: Vec<Record>,
}

impl Table {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Zero rows, no known columns. Used as the degraded state after a failed load.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.schema.contains(column)
    }

    /// Groupable values of `column`, or `None` if the column is absent.
    pub fn column(&self, column: Column) -> Option<Vec<Option<Value>>> {
        self.has_column(column)
            .then(|| self.records.iter().map(|r| r.value(column)).collect())
    }

    /// Year values of `column`, or `None` if the column is absent.
    pub fn years(&self, column: Column) -> Option<Vec<Option<i32>>> {
        self.has_column(column)
            .then(|| self.records.iter().map(|r| r.year(column)).collect())
    }

    /// Rows matching `predicate`, in their original order. The schema is kept.
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Record) -> bool,
    {
        Table {
            schema: self.schema.clone(),
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Sorted distinct non-null values; empty when the column is absent.
    pub fn distinct_nonnull(&self, column: Column) -> Vec<Value> {
        if !self.has_column(column) {
            return Vec::new();
        }
        self.records
            .iter()
            .filter_map(|r| r.value(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct non-null text values; empty when the column is absent.
    pub fn distinct_text(&self, column: Column) -> Vec<String> {
        if !self.has_column(column) {
            return Vec::new();
        }
        self.records
            .iter()
            .filter_map(|r| r.text(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Number of distinct non-null values; 0 when the column is absent.
    pub fn count_distinct(&self, column: Column) -> usize {
        if !self.has_column(column) {
            return 0;
        }
        self.records
            .iter()
            .filter_map(|r| r.value(column))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Sum of a measure column with nulls as 0; 0 when the column is absent.
    pub fn sum(&self, column: Column) -> f64 {
        self.records.iter().filter_map(|r| r.measure(column)).sum()
    }

    /// Partition rows by the values of `columns`, ordered by key.
    ///
    /// Rows with a null in any grouping column are dropped, so no group key
    /// ever contains a null. An absent grouping column yields no groups.
    pub fn group_by(&self, columns: &[Column]) -> BTreeMap<Vec<Value>, Table> {
        let mut groups: BTreeMap<Vec<Value>, Vec<Record>> = BTreeMap::new();
        if columns.iter().any(|c| !self.has_column(*c)) {
            return BTreeMap::new();
        }

        for record in &self.records {
            let key: Option<Vec<Value>> = columns.iter().map(|c| record.value(*c)).collect();
            if let Some(key) = key {
                groups.entry(key).or_default().push(record.clone());
            }
        }

        groups
            .into_iter()
            .map(|(key, records)| (key, Table::new(self.schema.clone(), records)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, product: Option<&str>, production: Option<f64>) -> Record {
        Record {
            country: Some(country.to_string()),
            product: product.map(str::to_string),
            production,
            ..Default::default()
        }
    }

    fn sample() -> Table {
        Table::new(
            Schema::with_columns([Column::Country, Column::Product, Column::Production]),
            vec![
                record("Kenya", Some("Maize"), Some(10.0)),
                record("Ethiopia", Some("Sorghum"), None),
                record("Kenya", None, Some(5.0)),
                record("Kenya", Some("Beans"), Some(2.5)),
            ],
        )
    }

    #[test]
    fn test_column_from_header() {
        assert_eq!(Column::from_header("admin_1"), Some(Column::Admin1));
        assert_eq!(Column::from_header(" production "), Some(Column::Production));
        assert_eq!(Column::from_header("Country"), None);
        assert_eq!(Column::from_header("fnid"), None);
    }

    #[test]
    fn test_absent_column_is_distinct_from_null() {
        let table = sample();
        assert!(table.column(Column::Admin1).is_none());

        let products = table.column(Column::Product).unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(products[2], None);
    }

    #[test]
    fn test_filter_preserves_order_and_schema() {
        let kenya = sample().filter(|r| r.country.as_deref() == Some("Kenya"));
        assert_eq!(kenya.len(), 3);
        assert_eq!(kenya.records()[0].product.as_deref(), Some("Maize"));
        assert_eq!(kenya.records()[2].product.as_deref(), Some("Beans"));
        assert!(kenya.has_column(Column::Product));
    }

    #[test]
    fn test_distinct_nonnull_sorted() {
        let table = sample();
        assert_eq!(
            table.distinct_text(Column::Product),
            vec!["Beans", "Maize", "Sorghum"]
        );
        assert_eq!(table.distinct_text(Column::Country), vec!["Ethiopia", "Kenya"]);
        assert!(table.distinct_nonnull(Column::Admin2).is_empty());
        assert_eq!(table.count_distinct(Column::Product), 3);
        assert_eq!(table.count_distinct(Column::SeasonName), 0);
    }

    #[test]
    fn test_sum_treats_null_as_zero() {
        let table = sample();
        assert_eq!(table.sum(Column::Production), 17.5);
        assert_eq!(table.sum(Column::Area), 0.0);
    }

    #[test]
    fn test_group_by_excludes_null_keys() {
        let groups = sample().group_by(&[Column::Country, Column::Product]);
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                vec![Value::from("Ethiopia"), Value::from("Sorghum")],
                vec![Value::from("Kenya"), Value::from("Beans")],
                vec![Value::from("Kenya"), Value::from("Maize")],
            ]
        );
    }

    #[test]
    fn test_group_by_absent_column_is_empty() {
        assert!(sample().group_by(&[Column::SeasonName]).is_empty());
    }

    #[test]
    fn test_value_ordering_and_serialization() {
        let mut values = vec![Value::from("Jan"), Value::Int(12), Value::Int(3)];
        values.sort();
        assert_eq!(values, vec![Value::Int(3), Value::Int(12), Value::from("Jan")]);
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[3,12,"Jan"]"#);
    }

    #[test]
    fn test_unknown_headers() {
        let schema = Schema::from_headers(vec![
            "fnid".to_string(),
            "country".to_string(),
            "yield".to_string(),
        ]);
        assert!(schema.contains(Column::Country));
        assert!(!schema.contains(Column::Area));
        assert_eq!(schema.unknown_headers(), vec!["fnid", "yield"]);
    }
}

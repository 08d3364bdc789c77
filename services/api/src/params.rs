//! Query-string parameters and their validation.
//!
//! Every field is read as an optional string so that missing and malformed
//! values produce messages naming the offending parameter.

use harvest_core::{AdminLevel, AdminPath, CropSeriesQuery, SeriesOptions, StatsError, SummaryQuery};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CountryParams {
    pub country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Admin2Params {
    pub country: Option<String>,
    pub admin_1_name: Option<String>,
}

/// Parameters of `/api/data` and `/api/crop-timeseries`.
#[derive(Debug, Default, Deserialize)]
pub struct DataParams {
    pub country: Option<String>,
    pub admin_level: Option<String>,
    pub admin_1_name: Option<String>,
    pub admin_2_name: Option<String>,
    pub timeseries_admin_level: Option<String>,
    pub split_by_season: Option<String>,
    pub crop_name: Option<String>,
}

impl CountryParams {
    pub fn country(&self) -> Result<&str, StatsError> {
        required(&self.country, "country")
    }
}

impl Admin2Params {
    pub fn validate(&self) -> Result<(&str, &str), StatsError> {
        let country = required(&self.country, "country")?;
        let admin_1 = required(&self.admin_1_name, "admin_1_name")?;
        Ok((country, admin_1))
    }
}

impl DataParams {
    pub fn summary_query(&self) -> Result<SummaryQuery, StatsError> {
        let country = required(&self.country, "country")?;
        let admin_level = required(&self.admin_level, "admin_level")?;
        let (path, series) = self.location(country, admin_level)?;
        Ok(SummaryQuery { path, series })
    }

    pub fn crop_series_query(&self) -> Result<CropSeriesQuery, StatsError> {
        let country = required(&self.country, "country")?;
        let admin_level = required(&self.admin_level, "admin_level")?;
        let crop_name = required(&self.crop_name, "crop_name")?;
        let (path, series) = self.location(country, admin_level)?;
        Ok(CropSeriesQuery {
            path,
            crop_name: crop_name.to_string(),
            series,
        })
    }

    fn location(
        &self,
        country: &str,
        admin_level: &str,
    ) -> Result<(AdminPath, SeriesOptions), StatsError> {
        let level = parse_level(admin_level, "admin_level")?;
        let series_level = match self.timeseries_admin_level.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_level(raw, "timeseries_admin_level")?,
            _ => AdminLevel::National,
        };

        let path = match level {
            AdminLevel::National => AdminPath::country(country),
            AdminLevel::Admin1 => {
                let admin_1 = required(&self.admin_1_name, "admin_1_name")
                    .map_err(|_| for_level("admin_1_name", level))?;
                AdminPath::admin_1(country, admin_1)
            }
            AdminLevel::Admin2 => {
                let admin_1 = required(&self.admin_1_name, "admin_1_name")
                    .map_err(|_| for_level("admin_1_name", level))?;
                let admin_2 = required(&self.admin_2_name, "admin_2_name")
                    .map_err(|_| for_level("admin_2_name", level))?;
                AdminPath::admin_2(country, admin_1, admin_2)
            }
        };

        let series = SeriesOptions {
            admin_level: series_level,
            split_by_season: parse_flag(self.split_by_season.as_deref()),
        };
        Ok((path, series))
    }
}

/// A present, non-empty parameter value.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, StatsError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StatsError::validation(format!("{} parameter is required", name))),
    }
}

fn for_level(name: &str, level: AdminLevel) -> StatsError {
    StatsError::validation(format!(
        "{} parameter is required for admin_level {}",
        name,
        level.as_u8()
    ))
}

pub fn parse_level(raw: &str, name: &str) -> Result<AdminLevel, StatsError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| StatsError::validation(format!("{} must be an integer (0, 1, or 2)", name)))?;
    AdminLevel::try_from(value)
        .map_err(|_| StatsError::validation(format!("{} must be 0, 1, or 2", name)))
}

/// Only a case-insensitive "true" enables a flag.
pub fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

//! Year coverage: range and gaps in a sequence of nullable years.

use std::collections::BTreeSet;

use serde::Serialize;

/// Min, max and missing years of a null-dropped year sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearCoverage {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub missing: Vec<i32>,
}

impl YearCoverage {
    pub fn from_years<I>(years: I) -> Self
    where
        I: IntoIterator<Item = Option<i32>>,
    {
        let present: BTreeSet<i32> = years.into_iter().flatten().collect();
        let (Some(&min), Some(&max)) = (present.first(), present.last()) else {
            return Self::default();
        };

        let missing = (min..=max).filter(|y| !present.contains(y)).collect();
        Self {
            min: Some(min),
            max: Some(max),
            missing,
        }
    }
}

/// Every year between the smallest and largest non-null year that does not occur.
pub fn missing_years<I>(years: I) -> Vec<i32>
where
    I: IntoIterator<Item = Option<i32>>,
{
    YearCoverage::from_years(years).missing
}

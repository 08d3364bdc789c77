//! Hierarchical filtering: country → admin-1 → admin-2.

use serde::Serialize;

use crate::error::{NotFound, StatsError};
use crate::table::{Column, Table};

/// Administrative level of a query (0 = national, 1 = admin-1, 2 = admin-2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum AdminLevel {
    #[default]
    National,
    Admin1,
    Admin2,
}

impl AdminLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            AdminLevel::National => 0,
            AdminLevel::Admin1 => 1,
            AdminLevel::Admin2 => 2,
        }
    }

    /// Column holding the unit names at this level; `None` for national.
    pub fn column(self) -> Option<Column> {
        match self {
            AdminLevel::National => None,
            AdminLevel::Admin1 => Some(Column::Admin1),
            AdminLevel::Admin2 => Some(Column::Admin2),
        }
    }
}

impl From<AdminLevel> for u8 {
    fn from(level: AdminLevel) -> Self {
        level.as_u8()
    }
}

impl TryFrom<i64> for AdminLevel {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AdminLevel::National),
            1 => Ok(AdminLevel::Admin1),
            2 => Ok(AdminLevel::Admin2),
            other => Err(other),
        }
    }
}

/// A location in the hierarchy. Admin-2 cannot be named without its admin-1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPath {
    Country {
        country: String,
    },
    Admin1 {
        country: String,
        admin_1: String,
    },
    Admin2 {
        country: String,
        admin_1: String,
        admin_2: String,
    },
}

impl AdminPath {
    pub fn country(country: impl Into<String>) -> Self {
        AdminPath::Country {
            country: country.into(),
        }
    }

    pub fn admin_1(country: impl Into<String>, admin_1: impl Into<String>) -> Self {
        AdminPath::Admin1 {
            country: country.into(),
            admin_1: admin_1.into(),
        }
    }

    pub fn admin_2(
        country: impl Into<String>,
        admin_1: impl Into<String>,
        admin_2: impl Into<String>,
    ) -> Self {
        AdminPath::Admin2 {
            country: country.into(),
            admin_1: admin_1.into(),
            admin_2: admin_2.into(),
        }
    }

    pub fn level(&self) -> AdminLevel {
        match self {
            AdminPath::Country { .. } => AdminLevel::National,
            AdminPath::Admin1 { .. } => AdminLevel::Admin1,
            AdminPath::Admin2 { .. } => AdminLevel::Admin2,
        }
    }

    pub fn country_name(&self) -> &str {
        match self {
            AdminPath::Country { country }
            | AdminPath::Admin1 { country, .. }
            | AdminPath::Admin2 { country, .. } => country,
        }
    }

    pub fn admin_1_name(&self) -> Option<&str> {
        match self {
            AdminPath::Country { .. } => None,
            AdminPath::Admin1 { admin_1, .. } | AdminPath::Admin2 { admin_1, .. } => Some(admin_1),
        }
    }

    pub fn admin_2_name(&self) -> Option<&str> {
        match self {
            AdminPath::Admin2 { admin_2, .. } => Some(admin_2),
            _ => None,
        }
    }
}

/// Rows of `table` under `path`.
///
/// Each stage narrows the previous one; the first stage that leaves no rows
/// determines which level the `NotFound` names.
pub fn filter_by_path(table: &Table, path: &AdminPath) -> Result<Table, StatsError> {
    let country = path.country_name();
    let subset = table.filter(|r| r.country.as_deref() == Some(country));
    if subset.is_empty() {
        return Err(NotFound::Country {
            country: country.to_string(),
        }
        .into());
    }

    let Some(admin_1) = path.admin_1_name() else {
        return Ok(subset);
    };
    let subset = subset.filter(|r| r.admin_1.as_deref() == Some(admin_1));
    if subset.is_empty() {
        return Err(NotFound::Admin1 {
            country: country.to_string(),
            admin_1: admin_1.to_string(),
        }
        .into());
    }

    let Some(admin_2) = path.admin_2_name() else {
        return Ok(subset);
    };
    let subset = subset.filter(|r| r.admin_2.as_deref() == Some(admin_2));
    if subset.is_empty() {
        return Err(NotFound::Admin2 {
            country: country.to_string(),
            admin_1: admin_1.to_string(),
            admin_2: admin_2.to_string(),
        }
        .into());
    }

    Ok(subset)
}

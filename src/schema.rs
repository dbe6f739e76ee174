//! Complaint dataset schema
//!
//! Canonical column names, the header aliases accepted at the load boundary,
//! and the required-column check each view runs before computing anything.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel meaning "no constraint" in a facet selection, and the value
/// null `state`/`city` cells are coerced to.
pub const ALL: &str = "All";

pub const COMPANY: &str = "company";
pub const STATE: &str = "state";
pub const CITY: &str = "city";
pub const STATUS: &str = "status";
pub const DATE: &str = "date";
pub const CASE_COUNT: &str = "case_count";
pub const DESCRIPTION: &str = "description";
pub const FLAG: &str = "flag";
pub const LOGO: &str = "logo";

/// Derived column holding the character length of `description`.
pub const DESCRIPTION_LENGTH: &str = "description_length";

/// Physical representation of a column once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Count,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Company,
    State,
    City,
    Status,
    Date,
    CaseCount,
    Description,
    Flag,
    Logo,
}

impl Column {
    pub const ALL_COLUMNS: [Column; 9] = [
        Column::Company,
        Column::State,
        Column::City,
        Column::Status,
        Column::Date,
        Column::CaseCount,
        Column::Description,
        Column::Flag,
        Column::Logo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Company => COMPANY,
            Column::State => STATE,
            Column::City => CITY,
            Column::Status => STATUS,
            Column::Date => DATE,
            Column::CaseCount => CASE_COUNT,
            Column::Description => DESCRIPTION,
            Column::Flag => FLAG,
            Column::Logo => LOGO,
        }
    }

    /// Portuguese headers used by the complaint exports.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Company => &["empresa"],
            Column::State => &["estado"],
            Column::City => &["cidade"],
            Column::Status => &[],
            Column::Date => &["data"],
            Column::CaseCount => &["casos"],
            Column::Description => &["descrição", "descricao"],
            Column::Flag => &["bandeira"],
            Column::Logo => &[],
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::CaseCount => ColumnKind::Count,
            Column::Date => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }

    /// Columns whose cells must never be null.
    pub fn is_required_value(self) -> bool {
        matches!(
            self,
            Column::Company | Column::Status | Column::CaseCount | Column::Description
        )
    }

    /// Resolve a header (canonical or alias, case-insensitive) to a column.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim().to_lowercase();
        Self::ALL_COLUMNS.into_iter().find(|column| {
            column.name() == header || column.aliases().iter().any(|alias| *alias == header)
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A categorical dimension usable as a filter constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Company,
    State,
    City,
    Status,
}

impl Facet {
    pub const ALL_FACETS: [Facet; 4] = [Facet::Company, Facet::State, Facet::City, Facet::Status];

    pub fn column(self) -> Column {
        match self {
            Facet::Company => Column::Company,
            Facet::State => Column::State,
            Facet::City => Column::City,
            Facet::Status => Column::Status,
        }
    }

    pub fn column_name(self) -> &'static str {
        self.column().name()
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Summary,
    Dashboard,
}

impl ViewKind {
    pub fn required_columns(self) -> &'static [Column] {
        match self {
            ViewKind::Summary => &[
                Column::Company,
                Column::State,
                Column::City,
                Column::Status,
                Column::CaseCount,
                Column::Flag,
                Column::Logo,
            ],
            ViewKind::Dashboard => &[
                Column::Company,
                Column::State,
                Column::Date,
                Column::CaseCount,
                Column::Description,
                Column::Status,
            ],
        }
    }
}

/// Fail with `MissingColumns` naming every required column absent from `present`,
/// in the order they were required.
pub fn validate_columns<S: AsRef<str>>(present: &[S], required: &[Column]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !present.iter().any(|name| name.as_ref() == column.name()))
        .map(|column| column.name().to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::MissingColumns(missing))
    }
}

//! Complaint dataset
//!
//! Wraps a polars `DataFrame` whose columns have been normalized once at the
//! load boundary: aliased headers renamed, categorical columns cast to strings,
//! null `state`/`city` cells replaced with the "All" sentinel, `case_count`
//! cast to `u64` and `date` to a calendar date.

use crate::error::{DashboardError, Result};
use crate::schema::{
    self, Column, ColumnKind, ALL, CASE_COUNT, CITY, COMPANY, DATE, DESCRIPTION, FLAG, LOGO,
    STATE, STATUS,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One row of the complaint dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub company: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub status: String,
    pub date: Option<NaiveDate>,
    pub case_count: u64,
    pub description: String,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl ComplaintRecord {
    pub fn new(
        company: impl Into<String>,
        status: impl Into<String>,
        case_count: u64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            state: None,
            city: None,
            status: status.into(),
            date: None,
            case_count,
            description: description.into(),
            flag: None,
            logo: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_branding(mut self, flag: impl Into<String>, logo: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self.logo = Some(logo.into());
        self
    }
}

/// Immutable, normalized complaint dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl Dataset {
    /// Normalize an externally built frame.
    pub fn from_frame(mut frame: DataFrame) -> Result<Self> {
        rename_aliases(&mut frame)?;
        parse_text_dates(&mut frame)?;
        check_whole_case_counts(&frame)?;

        let mut casts = Vec::new();
        let mut nulls_before = Vec::new();
        for column in Column::ALL_COLUMNS {
            let name = column.name();
            let Ok(series) = frame.column(name) else {
                continue;
            };
            let expr = match column.kind() {
                ColumnKind::Text => {
                    let text = col(name).cast(DataType::String);
                    if matches!(column, Column::State | Column::City) {
                        text.fill_null(lit(ALL))
                    } else {
                        text
                    }
                }
                ColumnKind::Count => col(name).cast(DataType::UInt64),
                ColumnKind::Date => {
                    if series.dtype() == &DataType::Date {
                        continue;
                    }
                    col(name).cast(DataType::Date)
                }
            };
            if column.kind() != ColumnKind::Text {
                nulls_before.push((column, series.null_count()));
            }
            casts.push(expr);
        }

        if !casts.is_empty() {
            frame = frame.lazy().with_columns(casts).collect()?;
        }

        // Casts are lenient; a value that became null could not be converted.
        for (column, before) in nulls_before {
            let after = frame.column(column.name())?.null_count();
            if after > before {
                return Err(DashboardError::InvalidData(format!(
                    "column '{}' has {} values that could not be converted",
                    column,
                    after - before
                )));
            }
        }

        for column in Column::ALL_COLUMNS.into_iter().filter(|c| c.is_required_value()) {
            if let Ok(series) = frame.column(column.name()) {
                let nulls = series.null_count();
                if nulls > 0 {
                    return Err(DashboardError::InvalidData(format!(
                        "column '{}' has {} missing or invalid values",
                        column, nulls
                    )));
                }
            }
        }

        debug!(rows = frame.height(), columns = frame.width(), "Dataset normalized");
        Ok(Self { frame })
    }

    pub fn from_records(records: &[ComplaintRecord]) -> Result<Self> {
        let frame = DataFrame::new(vec![
            Series::new(COMPANY, records.iter().map(|r| r.company.clone()).collect::<Vec<_>>()),
            Series::new(STATE, records.iter().map(|r| r.state.clone()).collect::<Vec<_>>()),
            Series::new(CITY, records.iter().map(|r| r.city.clone()).collect::<Vec<_>>()),
            Series::new(STATUS, records.iter().map(|r| r.status.clone()).collect::<Vec<_>>()),
            Series::new(
                DATE,
                records.iter().map(|r| r.date.map(date_to_days)).collect::<Vec<_>>(),
            )
            .cast(&DataType::Date)?,
            Series::new(CASE_COUNT, records.iter().map(|r| r.case_count).collect::<Vec<_>>()),
            Series::new(
                DESCRIPTION,
                records.iter().map(|r| r.description.clone()).collect::<Vec<_>>(),
            ),
            Series::new(FLAG, records.iter().map(|r| r.flag.clone()).collect::<Vec<_>>()),
            Series::new(LOGO, records.iter().map(|r| r.logo.clone()).collect::<Vec<_>>()),
        ])?;
        Self::from_frame(frame)
    }

    /// Load a CSV export with a header row. Unknown headers are ignored; empty
    /// cells are nulls.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading complaints from {}", path.display());

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut slots: Vec<Option<Column>> = Vec::with_capacity(headers.len());
        let mut builders: BTreeMap<Column, ColumnBuilder> = BTreeMap::new();
        for header in headers.iter() {
            match Column::from_header(header) {
                Some(column) if builders.contains_key(&column) => {
                    return Err(DashboardError::InvalidData(format!(
                        "header '{}' maps to column '{}' which appears more than once",
                        header, column
                    )));
                }
                Some(column) => {
                    builders.insert(column, ColumnBuilder::for_kind(column.kind()));
                    slots.push(Some(column));
                }
                None => {
                    debug!("Ignoring unknown column '{}'", header);
                    slots.push(None);
                }
            }
        }

        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            for (cell, slot) in row.iter().zip(&slots) {
                let Some(column) = slot else { continue };
                if let Some(builder) = builders.get_mut(column) {
                    builder
                        .push(cell)
                        .map_err(|reason| DashboardError::InvalidRecord {
                            line,
                            column: column.name().to_string(),
                            reason,
                        })?;
                }
            }
        }

        let columns = builders
            .into_iter()
            .map(|(column, builder)| builder.finish(column.name()))
            .collect::<Result<Vec<_>>>()?;
        let dataset = Self::from_frame(DataFrame::new(columns)?)?;
        info!(
            rows = dataset.height(),
            columns = ?dataset.column_names(),
            "Complaints loaded"
        );
        Ok(dataset)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Column presence check for a view or operation.
    pub fn require(&self, columns: &[Column]) -> Result<()> {
        schema::validate_columns(&self.column_names(), columns)
    }

    /// Wrap a frame derived from an already normalized dataset.
    pub(crate) fn derived(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub(crate) fn text_values(&self, name: &str) -> Result<Vec<Option<&str>>> {
        Ok(self.frame.column(name)?.str()?.into_iter().collect())
    }

    pub(crate) fn case_counts(&self) -> Result<Vec<u64>> {
        let counts = self.frame.column(CASE_COUNT)?.cast(&DataType::UInt64)?;
        let values = counts
            .u64()?
            .into_iter()
            .map(|value| value.unwrap_or(0))
            .collect();
        Ok(values)
    }

    pub(crate) fn dates(&self) -> Result<Vec<Option<NaiveDate>>> {
        let days = self
            .frame
            .column(DATE)?
            .cast(&DataType::Date)?
            .cast(&DataType::Int32)?;
        let values = days
            .i32()?
            .into_iter()
            .map(|value| value.and_then(days_to_date))
            .collect();
        Ok(values)
    }

    /// Typed rows. Requires the core columns; date, flag and logo are optional.
    pub fn records(&self) -> Result<Vec<ComplaintRecord>> {
        self.require(&[
            Column::Company,
            Column::State,
            Column::City,
            Column::Status,
            Column::CaseCount,
            Column::Description,
        ])?;

        let companies = self.text_values(COMPANY)?;
        let states = self.text_values(STATE)?;
        let cities = self.text_values(CITY)?;
        let statuses = self.text_values(STATUS)?;
        let descriptions = self.text_values(DESCRIPTION)?;
        let counts = self.case_counts()?;
        let dates = if self.has_column(DATE) {
            self.dates()?
        } else {
            vec![None; self.height()]
        };
        let flags = self.optional_text(FLAG)?;
        let logos = self.optional_text(LOGO)?;

        let records = (0..self.height())
            .map(|idx| ComplaintRecord {
                company: companies[idx].unwrap_or_default().to_string(),
                state: states[idx].map(str::to_string),
                city: cities[idx].map(str::to_string),
                status: statuses[idx].unwrap_or_default().to_string(),
                date: dates[idx],
                case_count: counts[idx],
                description: descriptions[idx].unwrap_or_default().to_string(),
                flag: flags[idx].map(str::to_string),
                logo: logos[idx].map(str::to_string),
            })
            .collect();
        Ok(records)
    }

    fn optional_text(&self, name: &str) -> Result<Vec<Option<&str>>> {
        if self.has_column(name) {
            self.text_values(name)
        } else {
            Ok(vec![None; self.height()])
        }
    }
}

/// Replace a text `date` column with calendar dates using the CSV date formats.
fn parse_text_dates(frame: &mut DataFrame) -> Result<()> {
    let Ok(series) = frame.column(DATE) else {
        return Ok(());
    };
    if series.dtype() != &DataType::String {
        return Ok(());
    }

    let days = series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, raw)| match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            None => Ok(None),
            Some(raw) => parse_date(raw)
                .map(|date| Some(date_to_days(date)))
                .map_err(|reason| {
                    DashboardError::InvalidData(format!("column '{}' row {}: {}", DATE, row, reason))
                }),
        })
        .collect::<Result<Vec<Option<i32>>>>()?;

    frame.with_column(Series::new(DATE, days).cast(&DataType::Date)?)?;
    Ok(())
}

/// Float `case_count` columns must hold whole, non-negative numbers.
fn check_whole_case_counts(frame: &DataFrame) -> Result<()> {
    let Ok(series) = frame.column(CASE_COUNT) else {
        return Ok(());
    };
    if !series.dtype().is_float() {
        return Ok(());
    }

    let values = series.cast(&DataType::Float64)?;
    for (row, value) in values.f64()?.into_iter().enumerate() {
        if let Some(value) = value {
            if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
                return Err(DashboardError::InvalidData(format!(
                    "column '{}' row {}: {} is not a non-negative integer",
                    CASE_COUNT, row, value
                )));
            }
        }
    }
    Ok(())
}

fn rename_aliases(frame: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    for name in names {
        let Some(column) = Column::from_header(&name) else {
            continue;
        };
        if name == column.name() {
            continue;
        }
        if frame.column(column.name()).is_ok() {
            return Err(DashboardError::InvalidData(format!(
                "columns '{}' and '{}' both map to '{}'",
                name,
                column.name(),
                column
            )));
        }
        debug!("Renaming column '{}' to '{}'", name, column);
        frame.rename(&name, column.name())?;
    }
    Ok(())
}

enum ColumnBuilder {
    Text(Vec<Option<String>>),
    Count(Vec<Option<u64>>),
    Date(Vec<Option<i32>>),
}

impl ColumnBuilder {
    fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => ColumnBuilder::Text(Vec::new()),
            ColumnKind::Count => ColumnBuilder::Count(Vec::new()),
            ColumnKind::Date => ColumnBuilder::Date(Vec::new()),
        }
    }

    fn push(&mut self, cell: &str) -> std::result::Result<(), String> {
        let cell = if cell.is_empty() { None } else { Some(cell) };
        match self {
            ColumnBuilder::Text(values) => values.push(cell.map(str::to_string)),
            ColumnBuilder::Count(values) => {
                let value = cell
                    .map(|raw| {
                        raw.parse::<u64>()
                            .map_err(|_| format!("'{}' is not a non-negative integer", raw))
                    })
                    .transpose()?;
                values.push(value);
            }
            ColumnBuilder::Date(values) => {
                let value = cell.map(parse_date).transpose()?;
                values.push(value.map(date_to_days));
            }
        }
        Ok(())
    }

    fn finish(self, name: &str) -> Result<Series> {
        let series = match self {
            ColumnBuilder::Text(values) => Series::new(name, values),
            ColumnBuilder::Count(values) => Series::new(name, values),
            ColumnBuilder::Date(values) => Series::new(name, values).cast(&DataType::Date)?,
        };
        Ok(series)
    }
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY`, `YYYY-MM-DD HH:MM:SS` and RFC 3339.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|datetime| datetime.date_naive())
        .map_err(|_| format!("'{}' is not a recognized date", raw))
}

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

//! Time-series and distribution preparation for the dashboard charts.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::{Column, COMPANY, DESCRIPTION, DESCRIPTION_LENGTH};
use chrono::NaiveDate;
use itertools::Itertools;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bin count of the description-length histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub case_count: u64,
}

/// Cases over time for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySeries {
    pub company: String,
    pub title: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Equal-width bins spanning `[min, max]` of `values`. The last bin is
    /// closed on the right so the maximum is counted.
    pub fn from_values(values: &[u32], bin_count: usize) -> Self {
        let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
            return Self { bins: Vec::new() };
        };
        if bin_count == 0 {
            return Self { bins: Vec::new() };
        }

        let lower = f64::from(min);
        let upper = if max > min { f64::from(max) } else { lower + 1.0 };
        let width = (upper - lower) / bin_count as f64;

        let mut counts = vec![0u64; bin_count];
        for &value in values {
            let idx = ((f64::from(value) - lower) / width).floor() as usize;
            counts[idx.min(bin_count - 1)] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(idx, count)| HistogramBin {
                lower: lower + width * idx as f64,
                upper: lower + width * (idx + 1) as f64,
                count,
            })
            .collect();
        Self { bins }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Copy of the dataset with a `description_length` column holding each
/// description's character length.
pub fn with_description_length(dataset: &Dataset) -> Result<Dataset> {
    dataset.require(&[Column::Description])?;
    let frame = dataset
        .frame()
        .clone()
        .lazy()
        .with_columns([col(DESCRIPTION).str().len_chars().alias(DESCRIPTION_LENGTH)])
        .collect()?;
    Ok(Dataset::derived(frame))
}

pub fn description_lengths(dataset: &Dataset) -> Result<Vec<u32>> {
    let derived = with_description_length(dataset)?;
    let lengths = derived
        .frame()
        .column(DESCRIPTION_LENGTH)?
        .cast(&DataType::UInt32)?;
    let values = lengths.u32()?.into_iter().flatten().collect();
    Ok(values)
}

pub fn max_description_length(dataset: &Dataset) -> Result<u32> {
    Ok(description_lengths(dataset)?.into_iter().max().unwrap_or(0))
}

pub fn description_length_histogram(dataset: &Dataset, bin_count: usize) -> Result<Histogram> {
    Ok(Histogram::from_values(&description_lengths(dataset)?, bin_count))
}

/// Distinct companies in order of first appearance.
pub fn companies_in_order(dataset: &Dataset) -> Result<Vec<String>> {
    dataset.require(&[Column::Company])?;
    Ok(dataset
        .text_values(COMPANY)?
        .into_iter()
        .flatten()
        .unique()
        .map(str::to_string)
        .collect())
}

/// Partition rows by company into `(date, case_count)` sequences ordered by
/// date. Rows without a date are skipped; same-date rows keep input order.
pub fn company_points(dataset: &Dataset) -> Result<HashMap<String, Vec<SeriesPoint>>> {
    dataset.require(&[Column::Company, Column::Date, Column::CaseCount])?;

    let companies = dataset.text_values(COMPANY)?;
    let dates = dataset.dates()?;
    let counts = dataset.case_counts()?;

    let mut partitions: HashMap<String, Vec<SeriesPoint>> = HashMap::new();
    for ((company, date), case_count) in companies.into_iter().zip(dates).zip(counts) {
        let (Some(company), Some(date)) = (company, date) else {
            continue;
        };
        partitions
            .entry(company.to_string())
            .or_default()
            .push(SeriesPoint { date, case_count });
    }

    for points in partitions.values_mut() {
        points.sort_by_key(|point| point.date);
    }
    Ok(partitions)
}

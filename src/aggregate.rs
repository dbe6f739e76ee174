//! Aggregate counters over a (possibly filtered) dataset.

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::schema::{Column, Facet, ALL, CASE_COUNT};
use itertools::Itertools;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const COUNT_ALIAS: &str = "__count";

/// What a group contributes to its category's count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Number of rows in the group.
    Rows,
    /// Sum of `case_count` over the group.
    Cases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

impl CategoryCount {
    pub fn new(category: impl Into<String>, count: u64) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }
}

/// Sum of `case_count` over all rows.
pub fn total_cases(dataset: &Dataset) -> Result<u64> {
    dataset.require(&[Column::CaseCount])?;
    dataset
        .case_counts()?
        .into_iter()
        .try_fold(0u64, |total, count| total.checked_add(count))
        .ok_or_else(|| DashboardError::InvalidData("total case count overflows u64".to_string()))
}

/// Categories ordered by count descending, ties broken by category name.
pub fn ranking(dataset: &Dataset, facet: Facet, mode: CountMode) -> Result<Vec<CategoryCount>> {
    let counts = grouped_counts(dataset, facet, mode)?;
    Ok(counts
        .into_iter()
        .sorted_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category.cmp(&b.category))
        })
        .collect())
}

/// Categories ordered by name, the x-axis order of the dashboard histograms.
pub fn category_totals(
    dataset: &Dataset,
    facet: Facet,
    mode: CountMode,
) -> Result<Vec<CategoryCount>> {
    let counts = grouped_counts(dataset, facet, mode)?;
    Ok(counts
        .into_iter()
        .sorted_by(|a, b| a.category.cmp(&b.category))
        .collect())
}

/// Selectable values for a facet: the sentinel followed by the sorted distinct values.
pub fn facet_options(dataset: &Dataset, facet: Facet) -> Result<Vec<String>> {
    dataset.require(&[facet.column()])?;
    let distinct: BTreeSet<&str> = dataset
        .text_values(facet.column_name())?
        .into_iter()
        .flatten()
        .filter(|value| *value != ALL)
        .collect();

    let mut options = Vec::with_capacity(distinct.len() + 1);
    options.push(ALL.to_string());
    options.extend(distinct.into_iter().map(str::to_string));
    Ok(options)
}

fn grouped_counts(dataset: &Dataset, facet: Facet, mode: CountMode) -> Result<Vec<CategoryCount>> {
    let name = facet.column_name();
    let mut required = vec![facet.column()];
    if mode == CountMode::Cases {
        required.push(Column::CaseCount);
    }
    dataset.require(&required)?;

    if dataset.is_empty() {
        return Ok(Vec::new());
    }

    let agg = match mode {
        CountMode::Rows => len().alias(COUNT_ALIAS),
        CountMode::Cases => col(CASE_COUNT).sum().alias(COUNT_ALIAS),
    };

    let grouped = dataset
        .frame()
        .clone()
        .lazy()
        .group_by([col(name)])
        .agg([agg])
        .collect()?;

    let categories = grouped.column(name)?.str()?;
    let counts = grouped.column(COUNT_ALIAS)?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    Ok(categories
        .into_iter()
        .zip(counts.into_iter())
        .map(|(category, count)| CategoryCount::new(category.unwrap_or(ALL), count.unwrap_or(0)))
        .collect())
}

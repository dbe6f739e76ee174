//! Detail dashboard: per-company case series and the distribution charts.

use crate::aggregate::{self, CategoryCount, CountMode};
use crate::dataset::Dataset;
use crate::distribution::{self, CompanySeries, Histogram};
use crate::error::Result;
use crate::filter::{self, FilterSelection, Selection};
use crate::schema::{Facet, ViewKind};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub company: Selection,
    pub state: Selection,
    pub status: Selection,
    pub min_description_length: usize,
    pub company_options: Vec<String>,
    pub state_options: Vec<String>,
    pub status_options: Vec<String>,
    /// Upper bound for the minimum-length selector.
    pub max_description_length: u32,
    pub filtered_rows: usize,
    pub filtered_cases: u64,
    pub time_series: Vec<CompanySeries>,
    pub status_histogram: Vec<CategoryCount>,
    pub description_length_histogram: Histogram,
    pub state_histogram: Vec<CategoryCount>,
}

impl DashboardView {
    /// Uses the company, state, status and minimum-length selections; the
    /// city selection does not apply to this view.
    pub fn compute(dataset: &Dataset, selection: &FilterSelection, bins: usize) -> Result<Self> {
        dataset.require(ViewKind::Dashboard.required_columns())?;

        let scoped = FilterSelection::new()
            .company(selection.company.clone())
            .state(selection.state.clone())
            .status(selection.status.clone())
            .min_description_length(selection.min_description_length);
        let filtered = filter::filter(dataset, &scoped)?;

        let view = Self {
            company: scoped.company.clone(),
            state: scoped.state.clone(),
            status: scoped.status.clone(),
            min_description_length: scoped.min_description_length,
            company_options: aggregate::facet_options(dataset, Facet::Company)?,
            state_options: aggregate::facet_options(dataset, Facet::State)?,
            status_options: aggregate::facet_options(dataset, Facet::Status)?,
            max_description_length: distribution::max_description_length(dataset)?,
            filtered_rows: filtered.height(),
            filtered_cases: aggregate::total_cases(&filtered)?,
            time_series: time_series(dataset, &filtered, &scoped)?,
            status_histogram: aggregate::category_totals(&filtered, Facet::Status, CountMode::Cases)?,
            description_length_histogram: distribution::description_length_histogram(&filtered, bins)?,
            state_histogram: aggregate::category_totals(&filtered, Facet::State, CountMode::Cases)?,
        };

        info!(
            company = %view.company,
            rows = view.filtered_rows,
            series = view.time_series.len(),
            "Dashboard view computed"
        );
        Ok(view)
    }
}

/// One series per company of the full dataset when no company is selected,
/// otherwise a single series for the selection.
fn time_series(
    dataset: &Dataset,
    filtered: &Dataset,
    selection: &FilterSelection,
) -> Result<Vec<CompanySeries>> {
    let mut partitions = distribution::company_points(filtered)?;

    match &selection.company {
        Selection::All => Ok(distribution::companies_in_order(dataset)?
            .into_iter()
            .map(|company| CompanySeries {
                title: format!("Cases over time - {}", company),
                points: partitions.remove(&company).unwrap_or_default(),
                company,
            })
            .collect()),
        Selection::Only(company) => {
            let region = match &selection.state {
                Selection::All => "all states".to_string(),
                Selection::Only(state) => state.clone(),
            };
            Ok(vec![CompanySeries {
                company: company.clone(),
                title: format!("Cases over time - {} in {}", company, region),
                points: partitions.remove(company).unwrap_or_default(),
            }])
        }
    }
}

//! Summary view: headline totals and rankings by state, city and status.

use crate::aggregate::{self, CategoryCount, CountMode};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::{self, FilterSelection, Selection};
use crate::schema::{Facet, ViewKind};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    pub company: Selection,
    pub state: Selection,
    pub city: Selection,
    pub company_options: Vec<String>,
    pub state_options: Vec<String>,
    pub city_options: Vec<String>,
    /// Cases across the whole dataset.
    pub overall_cases: u64,
    /// Cases of the selected company across the whole dataset.
    pub company_cases: u64,
    pub filtered_rows: usize,
    pub state_ranking: Vec<CategoryCount>,
    pub city_ranking: Vec<CategoryCount>,
    pub status_totals: Vec<CategoryCount>,
}

impl SummaryView {
    /// Uses the company, state and city selections; status and minimum
    /// length do not apply to this view.
    pub fn compute(dataset: &Dataset, selection: &FilterSelection) -> Result<Self> {
        dataset.require(ViewKind::Summary.required_columns())?;

        let overall_cases = aggregate::total_cases(dataset)?;
        let company_cases = if selection.company.is_all() {
            overall_cases
        } else {
            let company_only = FilterSelection::new().company(selection.company.clone());
            aggregate::total_cases(&filter::filter(dataset, &company_only)?)?
        };

        let scoped = FilterSelection::new()
            .company(selection.company.clone())
            .state(selection.state.clone())
            .city(selection.city.clone());
        let filtered = filter::filter(dataset, &scoped)?;

        let view = Self {
            company: selection.company.clone(),
            state: selection.state.clone(),
            city: selection.city.clone(),
            company_options: aggregate::facet_options(dataset, Facet::Company)?,
            state_options: aggregate::facet_options(dataset, Facet::State)?,
            city_options: aggregate::facet_options(dataset, Facet::City)?,
            overall_cases,
            company_cases,
            filtered_rows: filtered.height(),
            state_ranking: aggregate::ranking(&filtered, Facet::State, CountMode::Rows)?,
            city_ranking: aggregate::ranking(&filtered, Facet::City, CountMode::Rows)?,
            status_totals: aggregate::ranking(&filtered, Facet::Status, CountMode::Rows)?,
        };

        info!(
            company = %view.company,
            rows = view.filtered_rows,
            cases = view.company_cases,
            "Summary view computed"
        );
        Ok(view)
    }
}

//! Views
//!
//! Each view is a pure function from a dataset snapshot and a filter
//! selection to a serializable view model. `compute_view` is the entry point
//! used by front ends holding a `Session`.

pub mod dashboard;
pub mod summary;

pub use dashboard::DashboardView;
pub use summary::SummaryView;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::schema::ViewKind;
use crate::session::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewModel {
    Summary(SummaryView),
    Dashboard(DashboardView),
}

impl ViewModel {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewModel::Summary(_) => ViewKind::Summary,
            ViewModel::Dashboard(_) => ViewKind::Dashboard,
        }
    }
}

pub fn compute_view(
    session: &Session,
    kind: ViewKind,
    selection: &FilterSelection,
    config: &DashboardConfig,
) -> Result<ViewModel> {
    let dataset = session.dataset()?;
    match kind {
        ViewKind::Summary => Ok(ViewModel::Summary(SummaryView::compute(dataset, selection)?)),
        ViewKind::Dashboard => Ok(ViewModel::Dashboard(DashboardView::compute(
            dataset,
            selection,
            config.histogram_bins,
        )?)),
    }
}

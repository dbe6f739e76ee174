//! Session
//!
//! Holds the dataset snapshot the views read. A session starts empty; views
//! asked to render before a dataset is loaded fail with `DataNotLoaded`.

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Session {
    dataset: Option<Dataset>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
        }
    }

    /// Replace the current snapshot.
    pub fn load(&mut self, dataset: Dataset) {
        info!(rows = dataset.height(), "Session dataset replaced");
        self.dataset = Some(dataset);
    }

    pub fn load_csv(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let dataset = Dataset::load_csv(path)?;
        self.load(dataset);
        Ok(())
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or(DashboardError::DataNotLoaded)
    }
}

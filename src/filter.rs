//! Facet filtering
//!
//! A `FilterSelection` holds one `Selection` per facet plus the minimum
//! description length. Filtering compiles the active constraints into a single
//! polars predicate (logical AND) and never touches the input frame.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema::{Column, Facet, ALL, DESCRIPTION};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Spelling of the sentinel used by the Portuguese exports.
const ALL_PT: &str = "Todos";

/// Prefix forcing a literal value, so `=All` selects rows whose state or city
/// was coerced to the sentinel.
const LITERAL_PREFIX: char = '=';

/// One facet selection: either no constraint or an exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(value),
        }
    }

    /// Human-facing label; the sentinel renders as "All".
    pub fn label(&self) -> &str {
        self.value().unwrap_or(ALL)
    }
}

impl FromStr for Selection {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Some(literal) = raw.strip_prefix(LITERAL_PREFIX) {
            return Ok(Selection::Only(literal.to_string()));
        }
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) || raw.eq_ignore_ascii_case(ALL_PT) {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(raw.to_string()))
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub company: Selection,
    pub state: Selection,
    pub city: Selection,
    pub status: Selection,
    pub min_description_length: usize,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company(mut self, selection: Selection) -> Self {
        self.company = selection;
        self
    }

    pub fn state(mut self, selection: Selection) -> Self {
        self.state = selection;
        self
    }

    pub fn city(mut self, selection: Selection) -> Self {
        self.city = selection;
        self
    }

    pub fn status(mut self, selection: Selection) -> Self {
        self.status = selection;
        self
    }

    pub fn min_description_length(mut self, length: usize) -> Self {
        self.min_description_length = length;
        self
    }

    pub fn get(&self, facet: Facet) -> &Selection {
        match facet {
            Facet::Company => &self.company,
            Facet::State => &self.state,
            Facet::City => &self.city,
            Facet::Status => &self.status,
        }
    }

    /// Facets carrying a concrete value, in facet order.
    pub fn active_facets(&self) -> impl Iterator<Item = (Facet, &str)> + '_ {
        Facet::ALL_FACETS
            .into_iter()
            .filter_map(|facet| self.get(facet).value().map(|value| (facet, value)))
    }

    /// Columns the filter will read.
    pub fn required_columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self.active_facets().map(|(facet, _)| facet.column()).collect();
        if self.min_description_length > 0 {
            columns.push(Column::Description);
        }
        columns
    }

    fn predicate(&self) -> Option<Expr> {
        let facet_exprs = self
            .active_facets()
            .map(|(facet, value)| col(facet.column_name()).eq(lit(value)));

        let length_expr = (self.min_description_length > 0).then(|| {
            let threshold = u32::try_from(self.min_description_length).unwrap_or(u32::MAX);
            col(DESCRIPTION).str().len_chars().gt_eq(lit(threshold))
        });

        facet_exprs
            .chain(length_expr)
            .reduce(|acc, expr| acc.and(expr))
    }
}

/// Rows of `dataset` matching every active constraint, in input order.
pub fn filter(dataset: &Dataset, selection: &FilterSelection) -> Result<Dataset> {
    dataset.require(&selection.required_columns())?;

    let Some(predicate) = selection.predicate() else {
        return Ok(dataset.clone());
    };

    let frame = dataset.frame().clone().lazy().filter(predicate).collect()?;
    debug!(
        rows_in = dataset.height(),
        rows_out = frame.height(),
        "Applied filter {:?}",
        selection
    );
    Ok(Dataset::derived(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ComplaintRecord;
    use crate::error::DashboardError;

    fn sample() -> Dataset {
        Dataset::from_records(&[
            ComplaintRecord::new("A", "open", 3, "abc").with_state("X"),
            ComplaintRecord::new("B", "closed", 5, "abcdef").with_state("Y"),
            ComplaintRecord::new("A", "closed", 2, "çãõ").with_state("Y"),
        ])
        .unwrap()
    }

    #[test]
    fn test_selection_parses_sentinels() {
        assert_eq!("All".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("todos".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("SP".parse::<Selection>().unwrap(), Selection::only("SP"));
    }

    #[test]
    fn test_literal_prefix_selects_coerced_rows() {
        assert_eq!("=All".parse::<Selection>().unwrap(), Selection::only("All"));
        assert_eq!("=SP".parse::<Selection>().unwrap(), Selection::only("SP"));

        let selection = FilterSelection::new().state("=All".parse().unwrap());
        let filtered = filter(&sample(), &selection).unwrap();
        assert!(filtered.is_empty());

        let dataset = Dataset::from_records(&[
            ComplaintRecord::new("A", "open", 1, "abc").with_state("SP"),
            ComplaintRecord::new("B", "open", 2, "abc"),
        ])
        .unwrap();
        let filtered = filter(&dataset, &selection).unwrap();
        assert_eq!(filtered.height(), 1);
        assert_eq!(filtered.records().unwrap()[0].company, "B");
    }

    #[test]
    fn test_min_length_counts_characters_not_bytes() {
        let selection = FilterSelection::new().min_description_length(3);
        let filtered = filter(&sample(), &selection).unwrap();
        assert_eq!(filtered.height(), 3);

        let selection = FilterSelection::new().min_description_length(4);
        let filtered = filter(&sample(), &selection).unwrap();
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let selection = FilterSelection::new().company(Selection::only("Z"));
        let filtered = filter(&sample(), &selection).unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.column_names(), sample().column_names());
    }

    #[test]
    fn test_min_length_requires_description_column() {
        let frame = df![
            "company" => ["A"],
            "status" => ["open"],
            "case_count" => [1u64]
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();

        assert!(filter(&dataset, &FilterSelection::new()).is_ok());

        let err = filter(&dataset, &FilterSelection::new().min_description_length(1)).unwrap_err();
        match err {
            DashboardError::MissingColumns(missing) => assert_eq!(missing, vec!["description"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}

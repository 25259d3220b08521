//! Result shapes returned by the query engines

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Labeled numeric series, ordered as computed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    plot_id: &'static str,
    index_name: String,
    entries: Vec<(String, f64)>,
}

impl Series {
    pub(crate) fn new(
        plot_id: &'static str,
        index_name: impl Into<String>,
        entries: Vec<(String, f64)>,
    ) -> Self {
        Self {
            plot_id,
            index_name: index_name.into(),
            entries,
        }
    }

    /// Identifier of the aggregation that produced this series
    #[must_use]
    pub const fn plot_id(&self) -> &'static str {
        self.plot_id
    }

    /// Name of the label axis, e.g. `Concept` or `Brand`
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// `(label, value)` pairs
    #[must_use]
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Labels in order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Values in order
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, value)| *value).collect()
    }

    /// Value of the first entry with this label
    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| *value)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.plot_id, self.index_name)?;
        for (label, value) in &self.entries {
            writeln!(f, "  {label:<30} {value:>12.4}")?;
        }
        Ok(())
    }
}

/// Frequency and relevance of one concept
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevanceRow {
    /// Concept label
    pub concept: String,
    /// Summed mention count
    pub frequency: u64,
    /// Highest observed relevance score; `NaN` when none was reported
    pub relevance: f64,
}

/// Output of [`super::ConceptsDataset::frequency_relevance`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRelevance {
    /// Identifier of the aggregation
    pub plot_id: &'static str,
    /// Name of the label axis
    pub index_name: &'static str,
    /// One row per concept, in ranking order
    pub rows: Vec<RelevanceRow>,
}

impl FrequencyRelevance {
    /// Concept labels in order
    #[must_use]
    pub fn concepts(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.concept.as_str()).collect()
    }
}

/// Count of one concept within one date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesRow {
    /// Concept label as queried
    pub concept: String,
    /// Summed frequency inside the window
    pub count: u64,
    /// First day of the window
    pub start: NaiveDate,
    /// First day after the window
    pub stop: NaiveDate,
}

/// Output of [`super::ConceptsDataset::make_time_series`]
///
/// Rows are grouped by concept in query order, windows chronological.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    /// One row per concept and window
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeries {
    /// Counts in row order
    #[must_use]
    pub fn counts(&self) -> Vec<u64> {
        self.rows.iter().map(|row| row.count).collect()
    }

    /// Sum of counts for one concept label
    #[must_use]
    pub fn total(&self, concept: &str) -> u64 {
        self.rows
            .iter()
            .filter(|row| row.concept == concept)
            .map(|row| row.count)
            .sum()
    }
}

//! Read-only query engines over the analysis tables
//!
//! Each engine holds its backing tables as optional shared slices. Every
//! aggregation first checks that the tables it needs are present and fails
//! with [`AnalyticsError::NoRelevantData`] otherwise; a present but empty
//! table yields empty or zero results.

mod absa;
mod categories;
mod concepts;
mod sentiments;
mod series;
mod text_collection;

pub use absa::AbsaDataset;
pub use categories::CategoriesDataset;
pub use concepts::ConceptsDataset;
pub use sentiments::SentimentDataset;
pub use series::{FrequencyRelevance, RelevanceRow, Series, TimeSeries, TimeSeriesRow};
pub use text_collection::TextCollection;

use std::collections::HashMap;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AnalyticsError, Result};
use crate::metrics;
use crate::models::TableName;

/// Plot identifiers attached to aggregation results
///
/// They double as titles for downstream charts, so they are unique.
pub mod codes {
    /// Concepts ranked by descending frequency
    pub const MOST_COMMON_CONCEPTS: &str = "Most Common Concepts";
    /// Concepts ranked by ascending frequency
    pub const LEAST_COMMON_CONCEPTS: &str = "Least Common Concepts";
    /// Concepts sharing a sub-text with a query concept
    pub const CO_OCCURRING_CONCEPTS: &str = "Co-Occurring Concepts";
    /// Frequencies scaled for a word cloud
    pub const CONCEPT_CLOUD: &str = "Concept Cloud";
    /// Frequencies of requested concepts
    pub const CONCEPT_FREQUENCY: &str = "Concept Frequencies";
    /// Frequency paired with relevance per concept
    pub const FREQUENCY_RELEVANCE: &str = "Concept Relevance";

    /// Summed category probabilities
    pub const AGGREGATED_CATEGORIES: &str = "Categories";

    /// ABSA entities ranked by descending frequency
    pub const MOST_COMMON_ENTITIES: &str = "Most Common Entities";
    /// ABSA entities ranked by ascending frequency
    pub const LEAST_COMMON_ENTITIES: &str = "Least Common Entities";
    /// Entities sharing a sub-text with a query entity
    pub const CO_OCCURRING_ENTITIES: &str = "Co-Occurring Entities";
    /// Entities with the highest mean sentiment
    pub const BEST_RATED_ENTITIES: &str = "Best Rated Entities";
    /// Entities with the lowest mean sentiment
    pub const WORST_RATED_ENTITIES: &str = "Worst Rated Entities";
    /// Mean sentiment of requested entities
    pub const ENTITY_SENTIMENT: &str = "Entities Sentiment";
    /// Frequencies of requested entities
    pub const ENTITY_FREQUENCY: &str = "Entities Frequency";
}

/// Display label of a type-prefix filter
///
/// No prefix gives `default`. Otherwise the part before the first `_` is
/// singularized and capitalized: `brand` gives `Brand`, `feature_` gives
/// `Feature`, `features` gives `Feature`.
#[must_use]
pub fn type_label(prefix: Option<&str>, default: &str) -> String {
    let Some(head) = prefix
        .and_then(|p| p.split('_').next())
        .filter(|head| !head.is_empty())
    else {
        return default.to_string();
    };

    let lower = head.to_lowercase();
    let singular = if let Some(stem) = lower.strip_suffix("ies") {
        format!("{stem}y")
    } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 1 {
        lower[..lower.len() - 1].to_string()
    } else {
        lower
    };

    let mut chars = singular.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Case-insensitive comparison key of a concept or entity name
pub(crate) fn fold(name: &str) -> String {
    name.nfc().collect::<String>().to_lowercase()
}

/// True when `value` passes an optional type-prefix filter
pub(crate) fn has_prefix(value: &str, prefix: Option<&str>) -> bool {
    prefix.map_or(true, |p| value.starts_with(p))
}

/// Borrow a backing table, or fail with "no relevant data"
pub(crate) fn require<'a, T>(
    table: Option<&'a Arc<[T]>>,
    name: TableName,
    query: &'static str,
) -> Result<&'a [T]> {
    let rows = table.map(Arc::as_ref);
    metrics::global().record_query(query, rows.is_some());
    rows.ok_or_else(|| AnalyticsError::missing(name.as_str()))
}

/// Running totals keyed by exact name, remembering first-seen order
#[derive(Debug, Default)]
pub(crate) struct Tally {
    totals: Vec<(String, f64)>,
    positions: HashMap<String, usize>,
}

impl Tally {
    pub(crate) fn add(&mut self, name: &str, amount: f64) {
        if let Some(&index) = self.positions.get(name) {
            self.totals[index].1 += amount;
        } else {
            self.positions.insert(name.to_string(), self.totals.len());
            self.totals.push((name.to_string(), amount));
        }
    }

    pub(crate) fn total(&self) -> f64 {
        self.totals.iter().map(|(_, value)| value).sum()
    }

    /// Entries in first-seen order
    pub(crate) fn into_entries(self) -> Vec<(String, f64)> {
        self.totals
    }

    /// Entries sorted by value; equal values keep first-seen order
    pub(crate) fn ranked(mut self, descending: bool) -> Vec<(String, f64)> {
        if descending {
            self.totals.sort_by(|a, b| b.1.total_cmp(&a.1));
        } else {
            self.totals.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        self.totals
    }
}

/// Divide every value by `total`, leaving zeros when the total is zero
pub(crate) fn normalized(entries: &mut [(String, f64)], total: f64) {
    if total == 0.0 {
        return;
    }
    for (_, value) in entries {
        *value /= total;
    }
}

//! Aggregations over the `sentiments` table

use std::sync::Arc;

use super::require;
use crate::error::Result;
use crate::models::{SentimentRow, TableName, TableSet};

/// Query engine for document sentiment
#[derive(Debug, Clone, Default)]
pub struct SentimentDataset {
    sentiments: Option<Arc<[SentimentRow]>>,
}

impl SentimentDataset {
    /// Engine over the given sentiment rows; `None` means the table is absent
    #[must_use]
    pub fn new(sentiments: Option<Vec<SentimentRow>>) -> Self {
        Self {
            sentiments: sentiments.map(Arc::from),
        }
    }

    /// Engine over the matching table of a [`TableSet`]
    #[must_use]
    pub fn from_tables(tables: &TableSet) -> Self {
        Self::new(tables.sentiments.clone())
    }

    /// True when the backing table is present
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.sentiments.is_some()
    }

    /// Arithmetic mean of every sentiment value; `0.0` for an empty table
    pub fn average_sentiment(&self) -> Result<f64> {
        let rows = require(
            self.sentiments.as_ref(),
            TableName::Sentiments,
            "Average Sentiment",
        )?;
        if rows.is_empty() {
            return Ok(0.0);
        }
        let sum: f64 = rows.iter().map(|row| row.sentiment_value).sum();
        Ok(sum / rows.len() as f64)
    }
}

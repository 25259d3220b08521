//! Aggregations over the `categories` table

use std::sync::Arc;

use super::series::Series;
use super::{codes, require, Tally};
use crate::error::Result;
use crate::models::{CategoryRow, TableName, TableSet};

/// Query engine for category probabilities
#[derive(Debug, Clone, Default)]
pub struct CategoriesDataset {
    categories: Option<Arc<[CategoryRow]>>,
}

impl CategoriesDataset {
    /// Engine over the given category rows; `None` means the table is absent
    #[must_use]
    pub fn new(categories: Option<Vec<CategoryRow>>) -> Self {
        Self {
            categories: categories.map(Arc::from),
        }
    }

    /// Engine over the matching table of a [`TableSet`]
    #[must_use]
    pub fn from_tables(tables: &TableSet) -> Self {
        Self::new(tables.categories.clone())
    }

    /// True when the backing table is present
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.categories.is_some()
    }

    /// Summed probability of every category, highest first
    pub fn categories(&self) -> Result<Series> {
        let rows = require(
            self.categories.as_ref(),
            TableName::Categories,
            codes::AGGREGATED_CATEGORIES,
        )?;
        let mut tally = Tally::default();
        for row in rows.iter() {
            tally.add(&row.category, row.probability);
        }
        Ok(Series::new(
            codes::AGGREGATED_CATEGORIES,
            "Category",
            tally.ranked(true),
        ))
    }

    /// Category with the highest summed probability, if any row exists
    pub fn main_category(&self) -> Result<Option<String>> {
        Ok(self
            .categories()?
            .entries()
            .first()
            .map(|(label, _)| label.clone()))
    }
}

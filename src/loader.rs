//! Composite entry point building query engines from any table source
//!
//! A [`DatasetLoader`] owns one [`TableSet`] and builds each engine the first
//! time it is requested. Requesting an engine whose tables were never supplied
//! fails with [`AnalyticsError::NoRelevantData`].

use serde_json::Value;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::api::{parse_results, AnalysisResult};
use crate::dataset::{fold, AbsaDataset, CategoriesDataset, ConceptsDataset, SentimentDataset};
use crate::error::{AnalyticsError, Result};
use crate::models::{TableName, TableSet, TableView};
use crate::storage::{read_dir, MemoryWriter, TableSink, TableSource};

/// Holds analysis tables and lazily builds one engine per analysis kind
#[derive(Debug, Default)]
pub struct DatasetLoader {
    tables: TableSet,
    concepts: OnceCell<ConceptsDataset>,
    categories: OnceCell<CategoriesDataset>,
    sentiments: OnceCell<SentimentDataset>,
    absa: OnceCell<AbsaDataset>,
}

impl DatasetLoader {
    /// Loader over explicitly supplied tables
    #[must_use]
    pub fn new(tables: TableSet) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    /// Load the tables stored in `dir`
    ///
    /// With `backup_token`, each table comes from its most recent backup file
    /// whose suffix contains the token instead of the live file.
    pub fn from_path(dir: impl AsRef<Path>, backup_token: Option<&str>) -> Result<Self> {
        let dir = dir.as_ref();
        let tables = read_dir(dir, backup_token)?;
        info!(
            dir = %dir.display(),
            backup_token = ?backup_token,
            tables = ?tables.names(),
            "Created loader from directory"
        );
        Ok(Self::new(tables))
    }

    /// Convert raw analysis output, one object or a list of them
    ///
    /// Every object is written as consecutive documents.
    pub fn from_api_result(value: &Value) -> Result<Self> {
        Self::from_results(&parse_results(value)?)
    }

    /// Convert already parsed analysis results
    pub fn from_results(results: &[AnalysisResult]) -> Result<Self> {
        let mut store = MemoryWriter::new();
        store.init()?;
        for result in results {
            store.write_analysis(result, false)?;
        }
        store.close()?;
        debug!(results = results.len(), "Created loader from analysis results");
        Self::from_writer(&store)
    }

    /// Read the accumulated tables of a closed storage backend
    pub fn from_writer(source: &impl TableSource) -> Result<Self> {
        Ok(Self::new(source.load_tables()?))
    }

    /// True when concept tables were supplied
    #[must_use]
    pub fn has_concepts(&self) -> bool {
        self.tables.contains(TableName::Concepts)
            || self.tables.contains(TableName::ConceptsSurfaceStrings)
    }

    /// True when the categories table was supplied
    #[must_use]
    pub fn has_categories(&self) -> bool {
        self.tables.contains(TableName::Categories)
    }

    /// True when the sentiments table was supplied
    #[must_use]
    pub fn has_sentiments(&self) -> bool {
        self.tables.contains(TableName::Sentiments)
    }

    /// True when any ABSA table was supplied
    #[must_use]
    pub fn has_absa(&self) -> bool {
        [
            TableName::AbsaEntities,
            TableName::AbsaNormalizedTexts,
            TableName::AbsaRelations,
            TableName::AbsaRelationsEntities,
            TableName::AbsaEvaluations,
            TableName::AbsaEvaluationsEntities,
        ]
        .into_iter()
        .any(|name| self.tables.contains(name))
    }

    /// Concepts engine
    pub fn concepts(&self) -> Result<&ConceptsDataset> {
        if !self.has_concepts() {
            return Err(AnalyticsError::missing("concepts"));
        }
        Ok(self
            .concepts
            .get_or_init(|| ConceptsDataset::from_tables(&self.tables)))
    }

    /// Categories engine
    pub fn categories(&self) -> Result<&CategoriesDataset> {
        if !self.has_categories() {
            return Err(AnalyticsError::missing("categories"));
        }
        Ok(self
            .categories
            .get_or_init(|| CategoriesDataset::from_tables(&self.tables)))
    }

    /// Sentiment engine
    pub fn sentiments(&self) -> Result<&SentimentDataset> {
        if !self.has_sentiments() {
            return Err(AnalyticsError::missing("sentiments"));
        }
        Ok(self
            .sentiments
            .get_or_init(|| SentimentDataset::from_tables(&self.tables)))
    }

    /// ABSA engine
    pub fn absa(&self) -> Result<&AbsaDataset> {
        if !self.has_absa() {
            return Err(AnalyticsError::missing("absa"));
        }
        Ok(self.absa.get_or_init(|| AbsaDataset::from_tables(&self.tables)))
    }

    /// Raw access to one table, if it was supplied
    #[must_use]
    pub fn table(&self, name: TableName) -> Option<TableView<'_>> {
        self.tables.view(name)
    }

    /// All held tables
    #[must_use]
    pub const fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// Delete every concept row whose name matches one of `names`
    ///
    /// Matching is case-insensitive and also applies to the surface-string
    /// table. The concepts engine is rebuilt on next access.
    pub fn remove_concepts<S: AsRef<str>>(&mut self, names: &[S]) {
        let removed: HashSet<String> = names.iter().map(|name| fold(name.as_ref())).collect();
        let before = self.tables.concepts.as_ref().map_or(0, Vec::len);
        if let Some(rows) = self.tables.concepts.as_mut() {
            rows.retain(|row| !removed.contains(&fold(&row.concept)));
        }
        if let Some(rows) = self.tables.concepts_surface_strings.as_mut() {
            rows.retain(|row| !removed.contains(&fold(&row.concept)));
        }
        let after = self.tables.concepts.as_ref().map_or(0, Vec::len);
        debug!(removed = before - after, "Removed concept rows");
        self.concepts = OnceCell::new();
    }
}

impl From<TableSet> for DatasetLoader {
    fn from(tables: TableSet) -> Self {
        Self::new(tables)
    }
}

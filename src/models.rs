//! Record model for the flattened analysis tables
//!
//! Every table leads with `doc_id` (one submitted document) and `text_order`
//! (zero-based position of a sub-text within that document). Rows are created
//! by [`crate::writer::Writer`] and grouped per table in a [`TableSet`].

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

/// Identifier of one submitted document
pub type DocId = u64;

/// `(doc_id, text_order)` pair identifying one sub-text
pub type TextKey = (DocId, u64);

/// Names of the ten logical tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    /// Concept mentions with frequency and relevance
    Concepts,
    /// Surface strings of concept mentions
    ConceptsSurfaceStrings,
    /// Category probabilities
    Categories,
    /// Sentiment value per sub-text
    Sentiments,
    /// ABSA entity mentions
    AbsaEntities,
    /// Normalized text of each ABSA sub-text
    AbsaNormalizedTexts,
    /// ABSA relations
    AbsaRelations,
    /// Entities referenced by ABSA relations
    AbsaRelationsEntities,
    /// ABSA evaluations
    AbsaEvaluations,
    /// Entities referenced by ABSA evaluations
    AbsaEvaluationsEntities,
}

impl TableName {
    /// All tables, in canonical order
    pub const ALL: [Self; 10] = [
        Self::Concepts,
        Self::ConceptsSurfaceStrings,
        Self::Categories,
        Self::Sentiments,
        Self::AbsaEntities,
        Self::AbsaNormalizedTexts,
        Self::AbsaRelations,
        Self::AbsaRelationsEntities,
        Self::AbsaEvaluations,
        Self::AbsaEvaluationsEntities,
    ];

    /// Table name as used for raw access and file names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concepts => "concepts",
            Self::ConceptsSurfaceStrings => "concepts_surface_strings",
            Self::Categories => "categories",
            Self::Sentiments => "sentiments",
            Self::AbsaEntities => "absa_entities",
            Self::AbsaNormalizedTexts => "absa_normalized_texts",
            Self::AbsaRelations => "absa_relations",
            Self::AbsaRelationsEntities => "absa_relations_entities",
            Self::AbsaEvaluations => "absa_evaluations",
            Self::AbsaEvaluationsEntities => "absa_evaluations_entities",
        }
    }

    /// Canonical column list, which is also the header row on disk
    #[must_use]
    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Concepts => &[
                "doc_id",
                "text_order",
                "concept",
                "freq",
                "relevance_score",
                "concept_type",
            ],
            Self::ConceptsSurfaceStrings => &[
                "doc_id",
                "text_order",
                "concept",
                "surface_string",
                "text_span",
            ],
            Self::Categories => &["doc_id", "text_order", "category", "probability"],
            Self::Sentiments => &["doc_id", "text_order", "sentiment_value"],
            Self::AbsaEntities => &[
                "doc_id",
                "text_order",
                "entity_name",
                "entity_type",
                "surface_string",
                "text_span",
            ],
            Self::AbsaNormalizedTexts => &["doc_id", "text_order", "normalized_text"],
            Self::AbsaRelations => &[
                "doc_id",
                "text_order",
                "relation_id",
                "opinion_holder",
                "restriction",
                "sentiment_value",
                "is_external",
                "surface_string",
                "text_span",
            ],
            Self::AbsaRelationsEntities => &[
                "doc_id",
                "text_order",
                "relation_id",
                "entity_type",
                "entity_name",
            ],
            Self::AbsaEvaluations => &[
                "doc_id",
                "text_order",
                "evaluation_id",
                "sentiment_value",
                "surface_string",
                "text_span",
            ],
            Self::AbsaEvaluationsEntities => &[
                "doc_id",
                "text_order",
                "evaluation_id",
                "entity_type",
                "entity_name",
            ],
        }
    }

    /// File name of the table inside a data directory
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AnalyticsError::InvalidArgument(format!("Unknown table: {s}")))
    }
}

/// One concept mention within a sub-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Normalized concept name
    pub concept: String,
    /// Number of mentions in the sub-text
    pub freq: u64,
    /// Relevance of the concept for the sub-text, when reported
    pub relevance_score: Option<f64>,
    /// Free-form type tag such as `brand` or `feature_subjective`
    pub concept_type: String,
}

/// One surface form of a concept mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSurfaceRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Normalized concept name
    pub concept: String,
    /// Text as it appears in the sub-text
    pub surface_string: String,
    /// `"<start>-<end>"` character offsets
    pub text_span: String,
}

/// Probability of one category for a sub-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Category label
    pub category: String,
    /// Classifier probability
    pub probability: f64,
}

/// Sentiment of a sub-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Sentiment score
    pub sentiment_value: f64,
}

/// ABSA entity mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsaEntityRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Normalized entity name
    pub entity_name: String,
    /// Free-form type tag
    pub entity_type: String,
    /// Text as it appears in the sub-text
    pub surface_string: Option<String>,
    /// `"<start>-<end>"` character offsets
    pub text_span: Option<String>,
}

/// Normalized text of an ABSA sub-text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsaNormalizedTextRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Text after normalization by the analysis service
    pub normalized_text: String,
}

/// ABSA relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsaRelationRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Position of the relation within its sub-text
    pub relation_id: u64,
    /// Who holds the opinion, when reported
    pub opinion_holder: Option<String>,
    /// Restriction of the opinion, when reported
    pub restriction: Option<String>,
    /// Sentiment score of the relation
    pub sentiment_value: f64,
    /// True when the relation targets an entity outside the sub-text
    pub is_external: bool,
    /// Text as it appears in the sub-text
    pub surface_string: Option<String>,
    /// `"<start>-<end>"` character offsets
    pub text_span: Option<String>,
}

/// Entity referenced by an ABSA relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsaRelationEntityRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Relation this entity belongs to
    pub relation_id: u64,
    /// Free-form type tag
    pub entity_type: String,
    /// Normalized entity name
    pub entity_name: String,
}

/// ABSA evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsaEvaluationRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Position of the evaluation within its sub-text
    pub evaluation_id: u64,
    /// Sentiment score of the evaluation
    pub sentiment_value: f64,
    /// Text as it appears in the sub-text
    pub surface_string: Option<String>,
    /// `"<start>-<end>"` character offsets
    pub text_span: Option<String>,
}

/// Entity referenced by an ABSA evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsaEvaluationEntityRow {
    /// Document identifier
    pub doc_id: DocId,
    /// Sub-text position within the document
    pub text_order: u64,
    /// Evaluation this entity belongs to
    pub evaluation_id: u64,
    /// Free-form type tag
    pub entity_type: String,
    /// Normalized entity name
    pub entity_name: String,
}

/// A row type bound to one logical table
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Table holding rows of this type
    const TABLE: TableName;

    /// Sub-text this row belongs to
    fn text_key(&self) -> TextKey;

    /// This table's slot inside a table set
    fn slot(tables: &TableSet) -> &Option<Vec<Self>>;

    /// Mutable access to this table's slot
    fn slot_mut(tables: &mut TableSet) -> &mut Option<Vec<Self>>;
}

macro_rules! impl_record {
    ($row:ty, $table:ident, $field:ident) => {
        impl Record for $row {
            const TABLE: TableName = TableName::$table;

            fn text_key(&self) -> TextKey {
                (self.doc_id, self.text_order)
            }

            fn slot(tables: &TableSet) -> &Option<Vec<Self>> {
                &tables.$field
            }

            fn slot_mut(tables: &mut TableSet) -> &mut Option<Vec<Self>> {
                &mut tables.$field
            }
        }
    };
}

impl_record!(ConceptRow, Concepts, concepts);
impl_record!(ConceptSurfaceRow, ConceptsSurfaceStrings, concepts_surface_strings);
impl_record!(CategoryRow, Categories, categories);
impl_record!(SentimentRow, Sentiments, sentiments);
impl_record!(AbsaEntityRow, AbsaEntities, absa_entities);
impl_record!(AbsaNormalizedTextRow, AbsaNormalizedTexts, absa_normalized_texts);
impl_record!(AbsaRelationRow, AbsaRelations, absa_relations);
impl_record!(AbsaRelationEntityRow, AbsaRelationsEntities, absa_relations_entities);
impl_record!(AbsaEvaluationRow, AbsaEvaluations, absa_evaluations);
impl_record!(AbsaEvaluationEntityRow, AbsaEvaluationsEntities, absa_evaluations_entities);

/// The ten tables, each either absent (`None`) or present with rows
///
/// A present table may be empty; absence and emptiness are distinct states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    /// `concepts` table
    pub concepts: Option<Vec<ConceptRow>>,
    /// `concepts_surface_strings` table
    pub concepts_surface_strings: Option<Vec<ConceptSurfaceRow>>,
    /// `categories` table
    pub categories: Option<Vec<CategoryRow>>,
    /// `sentiments` table
    pub sentiments: Option<Vec<SentimentRow>>,
    /// `absa_entities` table
    pub absa_entities: Option<Vec<AbsaEntityRow>>,
    /// `absa_normalized_texts` table
    pub absa_normalized_texts: Option<Vec<AbsaNormalizedTextRow>>,
    /// `absa_relations` table
    pub absa_relations: Option<Vec<AbsaRelationRow>>,
    /// `absa_relations_entities` table
    pub absa_relations_entities: Option<Vec<AbsaRelationEntityRow>>,
    /// `absa_evaluations` table
    pub absa_evaluations: Option<Vec<AbsaEvaluationRow>>,
    /// `absa_evaluations_entities` table
    pub absa_evaluations_entities: Option<Vec<AbsaEvaluationEntityRow>>,
}

impl TableSet {
    /// Create a set with every table absent
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of one table, if present
    #[must_use]
    pub fn rows<R: Record>(&self) -> Option<&[R]> {
        R::slot(self).as_deref()
    }

    /// Replace a table with the given rows
    pub fn insert<R: Record>(&mut self, rows: Vec<R>) {
        *R::slot_mut(self) = Some(rows);
    }

    /// Append rows to a table, materializing it if it was absent
    pub fn extend<R: Record>(&mut self, rows: Vec<R>) {
        R::slot_mut(self).get_or_insert_with(Vec::new).extend(rows);
    }

    /// Append every present table of `other` to this set
    pub fn append(&mut self, mut other: Self) {
        self.merge::<ConceptRow>(&mut other);
        self.merge::<ConceptSurfaceRow>(&mut other);
        self.merge::<CategoryRow>(&mut other);
        self.merge::<SentimentRow>(&mut other);
        self.merge::<AbsaEntityRow>(&mut other);
        self.merge::<AbsaNormalizedTextRow>(&mut other);
        self.merge::<AbsaRelationRow>(&mut other);
        self.merge::<AbsaRelationEntityRow>(&mut other);
        self.merge::<AbsaEvaluationRow>(&mut other);
        self.merge::<AbsaEvaluationEntityRow>(&mut other);
    }

    fn merge<R: Record>(&mut self, other: &mut Self) {
        if let Some(rows) = R::slot_mut(other).take() {
            self.extend(rows);
        }
    }

    /// Borrow a table by name, if present
    #[must_use]
    pub fn view(&self, name: TableName) -> Option<TableView<'_>> {
        Some(match name {
            TableName::Concepts => TableView::Concepts(self.concepts.as_deref()?),
            TableName::ConceptsSurfaceStrings => {
                TableView::ConceptsSurfaceStrings(self.concepts_surface_strings.as_deref()?)
            }
            TableName::Categories => TableView::Categories(self.categories.as_deref()?),
            TableName::Sentiments => TableView::Sentiments(self.sentiments.as_deref()?),
            TableName::AbsaEntities => TableView::AbsaEntities(self.absa_entities.as_deref()?),
            TableName::AbsaNormalizedTexts => {
                TableView::AbsaNormalizedTexts(self.absa_normalized_texts.as_deref()?)
            }
            TableName::AbsaRelations => TableView::AbsaRelations(self.absa_relations.as_deref()?),
            TableName::AbsaRelationsEntities => {
                TableView::AbsaRelationsEntities(self.absa_relations_entities.as_deref()?)
            }
            TableName::AbsaEvaluations => {
                TableView::AbsaEvaluations(self.absa_evaluations.as_deref()?)
            }
            TableName::AbsaEvaluationsEntities => {
                TableView::AbsaEvaluationsEntities(self.absa_evaluations_entities.as_deref()?)
            }
        })
    }

    /// True when the named table is present
    #[must_use]
    pub fn contains(&self, name: TableName) -> bool {
        self.view(name).is_some()
    }

    /// Names of the present tables, in canonical order
    #[must_use]
    pub fn names(&self) -> Vec<TableName> {
        TableName::ALL
            .into_iter()
            .filter(|name| self.contains(*name))
            .collect()
    }

    /// True when no table is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

/// Borrowed view of one present table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableView<'a> {
    /// `concepts` rows
    Concepts(&'a [ConceptRow]),
    /// `concepts_surface_strings` rows
    ConceptsSurfaceStrings(&'a [ConceptSurfaceRow]),
    /// `categories` rows
    Categories(&'a [CategoryRow]),
    /// `sentiments` rows
    Sentiments(&'a [SentimentRow]),
    /// `absa_entities` rows
    AbsaEntities(&'a [AbsaEntityRow]),
    /// `absa_normalized_texts` rows
    AbsaNormalizedTexts(&'a [AbsaNormalizedTextRow]),
    /// `absa_relations` rows
    AbsaRelations(&'a [AbsaRelationRow]),
    /// `absa_relations_entities` rows
    AbsaRelationsEntities(&'a [AbsaRelationEntityRow]),
    /// `absa_evaluations` rows
    AbsaEvaluations(&'a [AbsaEvaluationRow]),
    /// `absa_evaluations_entities` rows
    AbsaEvaluationsEntities(&'a [AbsaEvaluationEntityRow]),
}

impl TableView<'_> {
    /// Which table this is
    #[must_use]
    pub const fn name(&self) -> TableName {
        match self {
            Self::Concepts(_) => TableName::Concepts,
            Self::ConceptsSurfaceStrings(_) => TableName::ConceptsSurfaceStrings,
            Self::Categories(_) => TableName::Categories,
            Self::Sentiments(_) => TableName::Sentiments,
            Self::AbsaEntities(_) => TableName::AbsaEntities,
            Self::AbsaNormalizedTexts(_) => TableName::AbsaNormalizedTexts,
            Self::AbsaRelations(_) => TableName::AbsaRelations,
            Self::AbsaRelationsEntities(_) => TableName::AbsaRelationsEntities,
            Self::AbsaEvaluations(_) => TableName::AbsaEvaluations,
            Self::AbsaEvaluationsEntities(_) => TableName::AbsaEvaluationsEntities,
        }
    }

    /// Number of rows
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Concepts(rows) => rows.len(),
            Self::ConceptsSurfaceStrings(rows) => rows.len(),
            Self::Categories(rows) => rows.len(),
            Self::Sentiments(rows) => rows.len(),
            Self::AbsaEntities(rows) => rows.len(),
            Self::AbsaNormalizedTexts(rows) => rows.len(),
            Self::AbsaRelations(rows) => rows.len(),
            Self::AbsaRelationsEntities(rows) => rows.len(),
            Self::AbsaEvaluations(rows) => rows.len(),
            Self::AbsaEvaluationsEntities(rows) => rows.len(),
        }
    }

    /// True when the table has no rows
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names
    #[must_use]
    pub const fn columns(&self) -> &'static [&'static str] {
        self.name().columns()
    }

    /// `(rows, columns)`
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.len(), self.columns().len())
    }
}

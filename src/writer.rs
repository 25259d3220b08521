//! Conversion of raw analysis results into table rows
//!
//! A [`Writer`] owns the running document-id counter. Every conversion
//! reserves ids from it: one per fragment by default, or exactly one for the
//! whole call in single-document mode, where fragments become consecutive
//! `text_order` positions of that one document.

use tracing::debug;

use crate::api::{AbsaText, AnalysisResult, CategoryScore, ConceptMention, SentimentScore};
use crate::models::{
    AbsaEntityRow, AbsaEvaluationEntityRow, AbsaEvaluationRow, AbsaNormalizedTextRow,
    AbsaRelationEntityRow, AbsaRelationRow, CategoryRow, ConceptRow, ConceptSurfaceRow, DocId,
    SentimentRow, TableSet, TextKey,
};

/// Document-id state shared by all analysis kinds written through it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Writer {
    next_id: DocId,
}

impl Writer {
    /// Writer whose first document gets id 0
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Writer continuing an existing dataset
    #[must_use]
    pub const fn starting_at(next_id: DocId) -> Self {
        Self { next_id }
    }

    /// Id the next document will receive
    #[must_use]
    pub const fn next_id(&self) -> DocId {
        self.next_id
    }

    fn reserve(&mut self, fragments: usize, single_document: bool) -> DocId {
        let first = self.next_id;
        let documents = if single_document { 1 } else { fragments as u64 };
        self.next_id += documents;
        first
    }

    /// Convert every kind present in `result`
    ///
    /// All kinds start from the same id; the counter advances by the longest
    /// fragment list (or by one in single-document mode).
    pub fn write_analysis(&mut self, result: &AnalysisResult, single_document: bool) -> TableSet {
        let first = self.reserve(result.fragment_count(), single_document);
        let mut tables = TableSet::new();
        if let Some(concepts) = &result.concepts {
            tables.append(concepts_to_rows(first, concepts, single_document));
        }
        if let Some(categories) = &result.categories {
            tables.append(categories_to_rows(first, categories, single_document));
        }
        if let Some(sentiments) = &result.sentiment {
            tables.append(sentiments_to_rows(first, sentiments, single_document));
        }
        if let Some(absa) = &result.absa {
            tables.append(absa_to_rows(first, absa, single_document));
        }
        tables
    }

    /// Convert concept fragments
    pub fn write_concepts(
        &mut self,
        concepts: &[Vec<ConceptMention>],
        single_document: bool,
    ) -> TableSet {
        let first = self.reserve(concepts.len(), single_document);
        concepts_to_rows(first, concepts, single_document)
    }

    /// Convert category fragments
    pub fn write_categories(
        &mut self,
        categories: &[Vec<CategoryScore>],
        single_document: bool,
    ) -> TableSet {
        let first = self.reserve(categories.len(), single_document);
        categories_to_rows(first, categories, single_document)
    }

    /// Convert sentiment fragments
    pub fn write_sentiment(
        &mut self,
        sentiments: &[SentimentScore],
        single_document: bool,
    ) -> TableSet {
        let first = self.reserve(sentiments.len(), single_document);
        sentiments_to_rows(first, sentiments, single_document)
    }

    /// Convert ABSA fragments
    pub fn write_absa(&mut self, absa: &[AbsaText], single_document: bool) -> TableSet {
        let first = self.reserve(absa.len(), single_document);
        absa_to_rows(first, absa, single_document)
    }
}

/// Position of the `index`-th fragment of a call starting at `first_id`
const fn position(first_id: DocId, index: usize, single_document: bool) -> TextKey {
    if single_document {
        (first_id, index as u64)
    } else {
        (first_id + index as u64, 0)
    }
}

/// Flatten concept fragments into `concepts` and `concepts_surface_strings`
///
/// The surface-string table is only materialized when at least one mention
/// carries surface data.
#[must_use]
pub fn concepts_to_rows(
    first_id: DocId,
    concepts: &[Vec<ConceptMention>],
    single_document: bool,
) -> TableSet {
    let mut concept_rows = Vec::new();
    let mut surface_rows = Vec::new();
    for (index, mentions) in concepts.iter().enumerate() {
        let (doc_id, text_order) = position(first_id, index, single_document);
        for mention in mentions {
            concept_rows.push(ConceptRow {
                doc_id,
                text_order,
                concept: mention.concept.clone(),
                freq: mention.freq,
                relevance_score: mention.relevance_score,
                concept_type: mention.concept_type.clone(),
            });
            for surface in mention.surface.iter().flatten() {
                surface_rows.push(ConceptSurfaceRow {
                    doc_id,
                    text_order,
                    concept: mention.concept.clone(),
                    surface_string: surface.surface_string.clone(),
                    text_span: surface.text_span(),
                });
            }
        }
    }
    debug!(
        first_id,
        concepts = concept_rows.len(),
        surface_strings = surface_rows.len(),
        "Converted concept fragments"
    );

    let mut tables = TableSet::new();
    tables.insert(concept_rows);
    if !surface_rows.is_empty() {
        tables.insert(surface_rows);
    }
    tables
}

/// Flatten category fragments into `categories`
#[must_use]
pub fn categories_to_rows(
    first_id: DocId,
    categories: &[Vec<CategoryScore>],
    single_document: bool,
) -> TableSet {
    let mut rows = Vec::new();
    for (index, scores) in categories.iter().enumerate() {
        let (doc_id, text_order) = position(first_id, index, single_document);
        rows.extend(scores.iter().map(|score| CategoryRow {
            doc_id,
            text_order,
            category: score.label.clone(),
            probability: score.probability,
        }));
    }
    debug!(first_id, categories = rows.len(), "Converted category fragments");

    let mut tables = TableSet::new();
    tables.insert(rows);
    tables
}

/// Flatten sentiment fragments into `sentiments`
#[must_use]
pub fn sentiments_to_rows(
    first_id: DocId,
    sentiments: &[SentimentScore],
    single_document: bool,
) -> TableSet {
    let rows: Vec<SentimentRow> = sentiments
        .iter()
        .enumerate()
        .map(|(index, score)| {
            let (doc_id, text_order) = position(first_id, index, single_document);
            SentimentRow {
                doc_id,
                text_order,
                sentiment_value: score.sentiment_value,
            }
        })
        .collect();
    debug!(first_id, sentiments = rows.len(), "Converted sentiment fragments");

    let mut tables = TableSet::new();
    tables.insert(rows);
    tables
}

/// Flatten ABSA fragments into the six `absa_*` tables
#[must_use]
pub fn absa_to_rows(first_id: DocId, absa: &[AbsaText], single_document: bool) -> TableSet {
    let mut entities = Vec::new();
    let mut texts = Vec::new();
    let mut relations = Vec::new();
    let mut relations_entities = Vec::new();
    let mut evaluations = Vec::new();
    let mut evaluations_entities = Vec::new();

    for (index, text) in absa.iter().enumerate() {
        let (doc_id, text_order) = position(first_id, index, single_document);

        for entity in &text.entities {
            for semantics in &entity.semantics {
                entities.push(AbsaEntityRow {
                    doc_id,
                    text_order,
                    entity_name: semantics.value.clone(),
                    entity_type: semantics.entity_type.clone(),
                    surface_string: entity.surface.as_ref().map(|s| s.surface_string.clone()),
                    text_span: entity.surface.as_ref().map(|s| s.text_span()),
                });
            }
        }

        texts.push(AbsaNormalizedTextRow {
            doc_id,
            text_order,
            normalized_text: text.normalized_text.clone(),
        });

        for (relation_id, relation) in (0u64..).zip(&text.relations) {
            relations.push(AbsaRelationRow {
                doc_id,
                text_order,
                relation_id,
                opinion_holder: relation.semantics.opinion_holder.clone(),
                restriction: relation.semantics.restriction.clone(),
                sentiment_value: relation.semantics.sentiment_value,
                is_external: relation.external_entity,
                surface_string: relation.surface.as_ref().map(|s| s.surface_string.clone()),
                text_span: relation.surface.as_ref().map(|s| s.text_span()),
            });
            relations_entities.extend(relation.semantics.entity.iter().map(|entity| {
                AbsaRelationEntityRow {
                    doc_id,
                    text_order,
                    relation_id,
                    entity_type: entity.entity_type.clone(),
                    entity_name: entity.value.clone(),
                }
            }));
        }

        for (evaluation_id, evaluation) in (0u64..).zip(&text.evaluations) {
            evaluations.push(AbsaEvaluationRow {
                doc_id,
                text_order,
                evaluation_id,
                sentiment_value: evaluation.semantics.sentiment_value,
                surface_string: evaluation.surface.as_ref().map(|s| s.surface_string.clone()),
                text_span: evaluation.surface.as_ref().map(|s| s.text_span()),
            });
            evaluations_entities.extend(evaluation.semantics.entity.iter().map(|entity| {
                AbsaEvaluationEntityRow {
                    doc_id,
                    text_order,
                    evaluation_id,
                    entity_type: entity.entity_type.clone(),
                    entity_name: entity.value.clone(),
                }
            }));
        }
    }
    debug!(
        first_id,
        entities = entities.len(),
        relations = relations.len(),
        evaluations = evaluations.len(),
        "Converted ABSA fragments"
    );

    let mut tables = TableSet::new();
    tables.insert(entities);
    tables.insert(texts);
    tables.insert(relations);
    tables.insert(relations_entities);
    tables.insert(evaluations);
    tables.insert(evaluations_entities);
    tables
}

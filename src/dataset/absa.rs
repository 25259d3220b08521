//! Aggregations over the six aspect-based sentiment tables

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use super::series::Series;
use super::{codes, fold, has_prefix, normalized, require, type_label, Tally};
use crate::error::{AnalyticsError, Result};
use crate::metrics;
use crate::models::{
    AbsaEntityRow, AbsaEvaluationEntityRow, AbsaEvaluationRow, AbsaNormalizedTextRow,
    AbsaRelationEntityRow, AbsaRelationRow, TableName, TableSet, TextKey,
};

const INDEX_NAME: &str = "Entity";

/// Query engine for ABSA entities, relations and evaluations
#[derive(Debug, Clone, Default)]
pub struct AbsaDataset {
    entities: Option<Arc<[AbsaEntityRow]>>,
    normalized_texts: Option<Arc<[AbsaNormalizedTextRow]>>,
    relations: Option<Arc<[AbsaRelationRow]>>,
    relations_entities: Option<Arc<[AbsaRelationEntityRow]>>,
    evaluations: Option<Arc<[AbsaEvaluationRow]>>,
    evaluations_entities: Option<Arc<[AbsaEvaluationEntityRow]>>,
}

/// An entity linked to a relation or evaluation, with that opinion's data
struct OpinionLink<'a> {
    key: TextKey,
    entity_name: &'a str,
    entity_type: &'a str,
    sentiment_value: f64,
    surface_string: Option<&'a str>,
    text_span: Option<&'a str>,
}

impl AbsaDataset {
    /// Engine over the given tables; `None` marks an absent table
    #[must_use]
    pub fn new(
        entities: Option<Vec<AbsaEntityRow>>,
        normalized_texts: Option<Vec<AbsaNormalizedTextRow>>,
        relations: Option<Vec<AbsaRelationRow>>,
        relations_entities: Option<Vec<AbsaRelationEntityRow>>,
        evaluations: Option<Vec<AbsaEvaluationRow>>,
        evaluations_entities: Option<Vec<AbsaEvaluationEntityRow>>,
    ) -> Self {
        Self {
            entities: entities.map(Arc::from),
            normalized_texts: normalized_texts.map(Arc::from),
            relations: relations.map(Arc::from),
            relations_entities: relations_entities.map(Arc::from),
            evaluations: evaluations.map(Arc::from),
            evaluations_entities: evaluations_entities.map(Arc::from),
        }
    }

    /// Engine over the ABSA tables of a table set
    #[must_use]
    pub fn from_tables(tables: &TableSet) -> Self {
        Self::new(
            tables.absa_entities.clone(),
            tables.absa_normalized_texts.clone(),
            tables.absa_relations.clone(),
            tables.absa_relations_entities.clone(),
            tables.absa_evaluations.clone(),
            tables.absa_evaluations_entities.clone(),
        )
    }

    /// True when at least one backing table is present
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.entities.is_some()
            || self.normalized_texts.is_some()
            || self.relations.is_some()
            || self.relations_entities.is_some()
            || self.evaluations.is_some()
            || self.evaluations_entities.is_some()
    }

    fn entity_rows(&self, query: &'static str) -> Result<&[AbsaEntityRow]> {
        require(self.entities.as_ref(), TableName::AbsaEntities, query)
    }

    /// Row count of each named entity, in the order given
    ///
    /// Names match case-insensitively; unknown names yield 0.
    pub fn entity_frequency<S: AsRef<str>>(
        &self,
        entities: &[S],
        entity_type_prefix: Option<&str>,
        normalize: bool,
    ) -> Result<Series> {
        let rows = self.entity_rows(codes::ENTITY_FREQUENCY)?;
        let mut counts: HashMap<String, f64> = HashMap::new();
        let mut population = 0.0;
        for row in rows
            .iter()
            .filter(|row| has_prefix(&row.entity_type, entity_type_prefix))
        {
            population += 1.0;
            *counts.entry(fold(&row.entity_name)).or_default() += 1.0;
        }

        let mut entries: Vec<(String, f64)> = entities
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (
                    name.to_string(),
                    counts.get(&fold(name)).copied().unwrap_or(0.0),
                )
            })
            .collect();
        if normalize {
            normalized(&mut entries, population);
        }
        Ok(Series::new(
            codes::ENTITY_FREQUENCY,
            type_label(entity_type_prefix, INDEX_NAME),
            entries,
        ))
    }

    fn ranking(
        &self,
        plot_id: &'static str,
        n: usize,
        entity_type_prefix: Option<&str>,
        normalize: bool,
        descending: bool,
    ) -> Result<Series> {
        let mut tally = Tally::default();
        for row in self
            .entity_rows(plot_id)?
            .iter()
            .filter(|row| has_prefix(&row.entity_type, entity_type_prefix))
        {
            tally.add(&row.entity_name, 1.0);
        }
        let population = tally.total();
        let mut entries = tally.ranked(descending);
        entries.truncate(n);
        if normalize {
            normalized(&mut entries, population);
        }
        Ok(Series::new(
            plot_id,
            type_label(entity_type_prefix, INDEX_NAME),
            entries,
        ))
    }

    /// The `n` entities mentioned most often
    pub fn most_common_entities(
        &self,
        n: usize,
        entity_type_prefix: Option<&str>,
        normalize: bool,
    ) -> Result<Series> {
        self.ranking(
            codes::MOST_COMMON_ENTITIES,
            n,
            entity_type_prefix,
            normalize,
            true,
        )
    }

    /// The `n` entities mentioned least often
    pub fn least_common_entities(
        &self,
        n: usize,
        entity_type_prefix: Option<&str>,
        normalize: bool,
    ) -> Result<Series> {
        self.ranking(
            codes::LEAST_COMMON_ENTITIES,
            n,
            entity_type_prefix,
            normalize,
            false,
        )
    }

    /// Entities mentioned in the same sub-texts as `entity`
    pub fn co_occurring_entities(
        &self,
        entity: &str,
        n: usize,
        entity_type_prefix: Option<&str>,
    ) -> Result<Series> {
        let rows = self.entity_rows(codes::CO_OCCURRING_ENTITIES)?;
        let target = fold(entity);
        let groups: HashSet<TextKey> = rows
            .iter()
            .filter(|row| fold(&row.entity_name) == target)
            .map(|row| (row.doc_id, row.text_order))
            .collect();

        let mut tally = Tally::default();
        for row in rows.iter().filter(|row| {
            groups.contains(&(row.doc_id, row.text_order))
                && has_prefix(&row.entity_type, entity_type_prefix)
                && fold(&row.entity_name) != target
        }) {
            tally.add(&row.entity_name, 1.0);
        }
        let mut entries = tally.ranked(true);
        entries.truncate(n);
        Ok(Series::new(
            codes::CO_OCCURRING_ENTITIES,
            type_label(entity_type_prefix, INDEX_NAME),
            entries,
        ))
    }

    /// Entity links of relations, then of evaluations, joined to their values
    ///
    /// Needs at least one complete pair of opinion and link tables.
    fn opinion_links(&self, query: &'static str) -> Result<Vec<OpinionLink<'_>>> {
        let relations = self.relations.as_ref().zip(self.relations_entities.as_ref());
        let evaluations = self
            .evaluations
            .as_ref()
            .zip(self.evaluations_entities.as_ref());
        metrics::global().record_query(query, relations.is_some() || evaluations.is_some());
        if relations.is_none() && evaluations.is_none() {
            return Err(AnalyticsError::missing("absa_relations or absa_evaluations"));
        }

        let mut links = Vec::new();
        if let Some((relations, linked)) = relations {
            let by_id: HashMap<(u64, u64, u64), &AbsaRelationRow> = relations
                .iter()
                .map(|row| ((row.doc_id, row.text_order, row.relation_id), row))
                .collect();
            links.extend(linked.iter().filter_map(|link| {
                let relation = by_id
                    .get(&(link.doc_id, link.text_order, link.relation_id))
                    .copied()?;
                Some(OpinionLink {
                    key: (link.doc_id, link.text_order),
                    entity_name: &link.entity_name,
                    entity_type: &link.entity_type,
                    sentiment_value: relation.sentiment_value,
                    surface_string: relation.surface_string.as_deref(),
                    text_span: relation.text_span.as_deref(),
                })
            }));
        }
        if let Some((evaluations, linked)) = evaluations {
            let by_id: HashMap<(u64, u64, u64), &AbsaEvaluationRow> = evaluations
                .iter()
                .map(|row| ((row.doc_id, row.text_order, row.evaluation_id), row))
                .collect();
            links.extend(linked.iter().filter_map(|link| {
                let evaluation = by_id
                    .get(&(link.doc_id, link.text_order, link.evaluation_id))
                    .copied()?;
                Some(OpinionLink {
                    key: (link.doc_id, link.text_order),
                    entity_name: &link.entity_name,
                    entity_type: &link.entity_type,
                    sentiment_value: evaluation.sentiment_value,
                    surface_string: evaluation.surface_string.as_deref(),
                    text_span: evaluation.text_span.as_deref(),
                })
            }));
        }
        Ok(links)
    }

    /// Mean sentiment per entity name, in first-seen order
    fn mean_sentiments(
        &self,
        query: &'static str,
        entity_type_prefix: Option<&str>,
    ) -> Result<Vec<(String, f64)>> {
        let mut sums = Tally::default();
        let mut counts: HashMap<&str, f64> = HashMap::new();
        let links = self.opinion_links(query)?;
        for link in links
            .iter()
            .filter(|link| has_prefix(link.entity_type, entity_type_prefix))
        {
            sums.add(link.entity_name, link.sentiment_value);
            *counts.entry(link.entity_name).or_default() += 1.0;
        }
        Ok(sums
            .into_entries()
            .into_iter()
            .map(|(name, sum)| {
                let count = counts.get(name.as_str()).copied().unwrap_or(1.0);
                (name, sum / count)
            })
            .collect())
    }

    fn rated(
        &self,
        plot_id: &'static str,
        n: usize,
        entity_type_prefix: Option<&str>,
        descending: bool,
    ) -> Result<Series> {
        let mut means = self.mean_sentiments(plot_id, entity_type_prefix)?;
        if descending {
            means.sort_by(|a, b| b.1.total_cmp(&a.1));
        } else {
            means.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        means.truncate(n);
        Ok(Series::new(
            plot_id,
            type_label(entity_type_prefix, INDEX_NAME),
            means,
        ))
    }

    /// The `n` entities with the highest mean sentiment
    pub fn best_rated_entities(
        &self,
        n: usize,
        entity_type_prefix: Option<&str>,
    ) -> Result<Series> {
        self.rated(codes::BEST_RATED_ENTITIES, n, entity_type_prefix, true)
    }

    /// The `n` entities with the lowest mean sentiment
    pub fn worst_rated_entities(
        &self,
        n: usize,
        entity_type_prefix: Option<&str>,
    ) -> Result<Series> {
        self.rated(codes::WORST_RATED_ENTITIES, n, entity_type_prefix, false)
    }

    /// Mean sentiment of each named entity; `NaN` when it has no opinions
    pub fn entity_sentiment<S: AsRef<str>>(&self, entities: &[S]) -> Result<Series> {
        let means: HashMap<String, f64> = self
            .mean_sentiments(codes::ENTITY_SENTIMENT, None)?
            .into_iter()
            .collect();
        let entries = entities
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (name.to_string(), means.get(name).copied().unwrap_or(f64::NAN))
            })
            .collect();
        Ok(Series::new(codes::ENTITY_SENTIMENT, INDEX_NAME, entries))
    }

    /// Normalized texts of every sub-text mentioning each named entity
    pub fn entity_texts<S: AsRef<str>>(
        &self,
        entities: &[S],
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let rows = self.entity_rows("Entity Texts")?;
        let texts = require(
            self.normalized_texts.as_ref(),
            TableName::AbsaNormalizedTexts,
            "Entity Texts",
        )?;
        let mut by_key: HashMap<TextKey, &str> = HashMap::new();
        for text in texts.iter() {
            by_key
                .entry((text.doc_id, text.text_order))
                .or_insert(&text.normalized_text);
        }

        Ok(entities
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let mut seen = HashSet::new();
                let found = rows
                    .iter()
                    .filter(|row| row.entity_name == name)
                    .map(|row| (row.doc_id, row.text_order))
                    .filter(|key| seen.insert(*key))
                    .filter_map(|key| by_key.get(&key).map(|text| (*text).to_string()))
                    .collect();
                (name.to_string(), found)
            })
            .collect())
    }

    /// Surface strings of the relations and evaluations linked to each entity
    ///
    /// Relations come first. An opinion span shared by a relation and an
    /// evaluation of the same sub-text is reported once.
    pub fn surface_strings<S: AsRef<str>>(
        &self,
        entities: &[S],
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let links = self.opinion_links("Entity Surface Strings")?;
        Ok(entities
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let mut seen = HashSet::new();
                let found = links
                    .iter()
                    .filter(|link| link.entity_name == name)
                    .filter_map(|link| {
                        let surface = link.surface_string?;
                        seen.insert((link.key, link.text_span, surface))
                            .then(|| surface.to_string())
                    })
                    .collect();
                (name.to_string(), found)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tables_absent() {
        let dataset = AbsaDataset::default();
        assert!(!dataset.has_data());
        assert!(dataset
            .best_rated_entities(1, None)
            .unwrap_err()
            .is_no_relevant_data());
        assert!(dataset
            .entity_texts(&["Lenovo"])
            .unwrap_err()
            .is_no_relevant_data());
    }

    #[test]
    fn test_link_without_parent_is_ignored() {
        let dataset = AbsaDataset::new(
            None,
            None,
            Some(Vec::new()),
            Some(vec![AbsaRelationEntityRow {
                doc_id: 0,
                text_order: 0,
                relation_id: 3,
                entity_type: "brand".to_string(),
                entity_name: "Lenovo".to_string(),
            }]),
            None,
            None,
        );
        let series = dataset.entity_sentiment(&["Lenovo"]).unwrap();
        assert!(series.values()[0].is_nan());
    }
}

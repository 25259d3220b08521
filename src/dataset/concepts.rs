//! Aggregations over the `concepts` and `concepts_surface_strings` tables

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;

use super::series::{FrequencyRelevance, RelevanceRow, Series, TimeSeries, TimeSeriesRow};
use super::text_collection::TextCollection;
use super::{codes, fold, has_prefix, normalized, require, type_label, Tally};
use crate::error::{AnalyticsError, Result};
use crate::models::{ConceptRow, ConceptSurfaceRow, DocId, TableName, TableSet, TextKey};
use crate::validation::InputValidator;

const INDEX_NAME: &str = "Concept";

/// Query engine for concept mentions
#[derive(Debug, Clone, Default)]
pub struct ConceptsDataset {
    concepts: Option<Arc<[ConceptRow]>>,
    surface_strings: Option<Arc<[ConceptSurfaceRow]>>,
}

impl ConceptsDataset {
    /// Engine over the given tables; `None` marks an absent table
    #[must_use]
    pub fn new(
        concepts: Option<Vec<ConceptRow>>,
        surface_strings: Option<Vec<ConceptSurfaceRow>>,
    ) -> Self {
        Self {
            concepts: concepts.map(Arc::from),
            surface_strings: surface_strings.map(Arc::from),
        }
    }

    /// Engine over the concept tables of a table set
    #[must_use]
    pub fn from_tables(tables: &TableSet) -> Self {
        Self::new(
            tables.concepts.clone(),
            tables.concepts_surface_strings.clone(),
        )
    }

    /// True when at least one backing table is present
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.concepts.is_some() || self.surface_strings.is_some()
    }

    fn rows(&self, query: &'static str) -> Result<&[ConceptRow]> {
        require(self.concepts.as_ref(), TableName::Concepts, query)
    }

    /// Summed `freq` of each named concept, in the order given
    ///
    /// Names match case-insensitively; unknown names yield 0. With
    /// `normalize`, values are divided by the total frequency of the
    /// prefix-filtered population.
    pub fn concept_frequency<S: AsRef<str>>(
        &self,
        concepts: &[S],
        concept_type_prefix: Option<&str>,
        normalize: bool,
    ) -> Result<Series> {
        let rows = self.rows(codes::CONCEPT_FREQUENCY)?;
        let mut totals: HashMap<String, f64> = HashMap::new();
        let mut population = 0.0;
        for row in rows
            .iter()
            .filter(|row| has_prefix(&row.concept_type, concept_type_prefix))
        {
            population += row.freq as f64;
            *totals.entry(fold(&row.concept)).or_default() += row.freq as f64;
        }

        let mut entries: Vec<(String, f64)> = concepts
            .iter()
            .map(|name| {
                let name = name.as_ref();
                (
                    name.to_string(),
                    totals.get(&fold(name)).copied().unwrap_or(0.0),
                )
            })
            .collect();
        if normalize {
            normalized(&mut entries, population);
        }
        Ok(Series::new(
            codes::CONCEPT_FREQUENCY,
            type_label(concept_type_prefix, INDEX_NAME),
            entries,
        ))
    }

    fn tally(&self, query: &'static str, concept_type_prefix: Option<&str>) -> Result<Tally> {
        let mut tally = Tally::default();
        for row in self
            .rows(query)?
            .iter()
            .filter(|row| has_prefix(&row.concept_type, concept_type_prefix))
        {
            tally.add(&row.concept, row.freq as f64);
        }
        Ok(tally)
    }

    fn ranking(
        &self,
        plot_id: &'static str,
        n: usize,
        concept_type_prefix: Option<&str>,
        normalize: bool,
        descending: bool,
    ) -> Result<Series> {
        let tally = self.tally(plot_id, concept_type_prefix)?;
        let population = tally.total();
        let mut entries = tally.ranked(descending);
        entries.truncate(n);
        if normalize {
            normalized(&mut entries, population);
        }
        Ok(Series::new(
            plot_id,
            type_label(concept_type_prefix, INDEX_NAME),
            entries,
        ))
    }

    /// The `n` concepts with the highest summed frequency
    pub fn most_common_concepts(
        &self,
        n: usize,
        concept_type_prefix: Option<&str>,
        normalize: bool,
    ) -> Result<Series> {
        self.ranking(
            codes::MOST_COMMON_CONCEPTS,
            n,
            concept_type_prefix,
            normalize,
            true,
        )
    }

    /// The `n` concepts with the lowest summed frequency
    pub fn least_common_concepts(
        &self,
        n: usize,
        concept_type_prefix: Option<&str>,
        normalize: bool,
    ) -> Result<Series> {
        self.ranking(
            codes::LEAST_COMMON_CONCEPTS,
            n,
            concept_type_prefix,
            normalize,
            false,
        )
    }

    /// Every distinct concept by descending frequency
    pub fn concept_frequencies(&self, concept_type_prefix: Option<&str>) -> Result<Series> {
        self.ranking(
            codes::CONCEPT_CLOUD,
            usize::MAX,
            concept_type_prefix,
            false,
            true,
        )
    }

    /// Concepts appearing in the same sub-texts as `concept`
    ///
    /// Frequencies are summed over those sub-texts; the query concept itself
    /// is excluded.
    pub fn co_occurring_concepts(
        &self,
        concept: &str,
        n: usize,
        concept_type_prefix: Option<&str>,
    ) -> Result<Series> {
        let rows = self.rows(codes::CO_OCCURRING_CONCEPTS)?;
        let target = fold(concept);
        let groups: HashSet<TextKey> = rows
            .iter()
            .filter(|row| fold(&row.concept) == target)
            .map(|row| (row.doc_id, row.text_order))
            .collect();

        let mut tally = Tally::default();
        for row in rows.iter().filter(|row| {
            groups.contains(&(row.doc_id, row.text_order))
                && has_prefix(&row.concept_type, concept_type_prefix)
                && fold(&row.concept) != target
        }) {
            tally.add(&row.concept, row.freq as f64);
        }
        let mut entries = tally.ranked(true);
        entries.truncate(n);
        Ok(Series::new(
            codes::CO_OCCURRING_CONCEPTS,
            type_label(concept_type_prefix, INDEX_NAME),
            entries,
        ))
    }

    /// Total frequency and highest relevance per concept
    ///
    /// Without an explicit list, the `n` most frequent concepts are reported.
    pub fn frequency_relevance<S: AsRef<str>>(
        &self,
        concepts: Option<&[S]>,
        n: usize,
    ) -> Result<FrequencyRelevance> {
        let rows = self.rows(codes::FREQUENCY_RELEVANCE)?;
        let names: Vec<String> = match concepts {
            Some(names) => names.iter().map(|name| name.as_ref().to_string()).collect(),
            None => {
                let mut tally = Tally::default();
                for row in rows {
                    tally.add(&row.concept, row.freq as f64);
                }
                let mut ranked = tally.ranked(true);
                ranked.truncate(n);
                ranked.into_iter().map(|(name, _)| name).collect()
            }
        };

        let result = names
            .into_iter()
            .map(|concept| {
                let key = fold(&concept);
                let matching = rows.iter().filter(|row| fold(&row.concept) == key);
                let (frequency, relevance) =
                    matching.fold((0u64, None::<f64>), |(freq, best), row| {
                        let best = match (best, row.relevance_score) {
                            (Some(b), Some(r)) => Some(b.max(r)),
                            (b, r) => b.or(r),
                        };
                        (freq + row.freq, best)
                    });
                RelevanceRow {
                    concept,
                    frequency,
                    relevance: relevance.unwrap_or(f64::NAN),
                }
            })
            .collect();
        Ok(FrequencyRelevance {
            plot_id: codes::FREQUENCY_RELEVANCE,
            index_name: INDEX_NAME,
            rows: result,
        })
    }

    /// Pseudo-document collection, one document per sub-text
    ///
    /// Each concept name appears `freq` times in its sub-text's document.
    pub fn nltk_textcollection(&self, concept_type_prefix: Option<&str>) -> Result<TextCollection> {
        let rows = self.rows("Concept Text Collection")?;
        let mut order: Vec<Vec<(String, u64)>> = Vec::new();
        let mut positions: HashMap<TextKey, usize> = HashMap::new();
        for row in rows
            .iter()
            .filter(|row| has_prefix(&row.concept_type, concept_type_prefix))
        {
            let index = *positions
                .entry((row.doc_id, row.text_order))
                .or_insert_with(|| {
                    order.push(Vec::new());
                    order.len() - 1
                });
            order[index].push((row.concept.clone(), row.freq));
        }
        let collection = TextCollection::new(order);
        debug!(documents = collection.len(), "Built concept text collection");
        Ok(collection)
    }

    /// Predicate true for concepts whose idf is above `threshold`
    pub fn make_idf_filter(
        &self,
        threshold: f64,
        concept_type_prefix: Option<&str>,
    ) -> Result<impl Fn(&str) -> bool> {
        let collection = self.nltk_textcollection(concept_type_prefix)?;
        Ok(move |concept: &str| collection.idf(concept) > threshold)
    }

    /// Concept counts per date window
    ///
    /// Windows start at the interval start and advance by `window` while the
    /// window start is not after the interval end. Rows whose document has no
    /// date are ignored. A non-positive window or a reversed interval is an
    /// [`AnalyticsError::InvalidArgument`].
    pub fn make_time_series<S: AsRef<str>>(
        &self,
        concepts: &[S],
        doc_dates: &HashMap<DocId, NaiveDate>,
        window: Duration,
        interval: RangeInclusive<NaiveDate>,
    ) -> Result<TimeSeries> {
        let rows = self.rows("Concept Time Series")?;
        InputValidator::validate_window(window)
            .and_then(|()| InputValidator::validate_date_range(*interval.start(), *interval.end()))
            .map_err(|e| AnalyticsError::InvalidArgument(e.to_string()))?;

        let mut windows = Vec::new();
        let mut start = *interval.start();
        while start <= *interval.end() {
            let stop = start.checked_add_signed(window).ok_or_else(|| {
                AnalyticsError::InvalidArgument(format!("window past {start} is out of range"))
            })?;
            windows.push((start, stop));
            start = stop;
        }

        let mut series = TimeSeries::default();
        for name in concepts {
            let name = name.as_ref();
            let key = fold(name);
            let dated: Vec<(NaiveDate, u64)> = rows
                .iter()
                .filter(|row| fold(&row.concept) == key)
                .filter_map(|row| doc_dates.get(&row.doc_id).map(|date| (*date, row.freq)))
                .collect();
            for &(start, stop) in &windows {
                let count = dated
                    .iter()
                    .filter(|(date, _)| (start..stop).contains(date))
                    .map(|(_, freq)| freq)
                    .sum();
                series.rows.push(TimeSeriesRow {
                    concept: name.to_string(),
                    count,
                    start,
                    stop,
                });
            }
        }
        Ok(series)
    }

    /// Surface strings recorded for each named concept
    pub fn concept_surface_strings<S: AsRef<str>>(
        &self,
        concepts: &[S],
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let rows = require(
            self.surface_strings.as_ref(),
            TableName::ConceptsSurfaceStrings,
            "Concept Surface Strings",
        )?;
        Ok(concepts
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let key = fold(name);
                let strings = rows
                    .iter()
                    .filter(|row| fold(&row.concept) == key)
                    .map(|row| row.surface_string.clone())
                    .collect();
                (name.to_string(), strings)
            })
            .collect())
    }
}

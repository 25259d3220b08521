//! Raw result objects returned by the text-analysis service
//!
//! One [`AnalysisResult`] describes one submitted batch. Each present key holds
//! an ordered list of per-sub-text fragments. Missing optional sub-fields
//! deserialize to `None`; missing required ones are a data-shape error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Result object of one `analyze` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Concept mentions, one list per sub-text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<Vec<ConceptMention>>>,
    /// Category scores, one list per sub-text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Vec<CategoryScore>>>,
    /// One sentiment per sub-text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Vec<SentimentScore>>,
    /// One ABSA result per sub-text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absa: Option<Vec<AbsaText>>,
}

impl AnalysisResult {
    /// Number of fragments of the longest list present
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        [
            self.concepts.as_ref().map(Vec::len),
            self.categories.as_ref().map(Vec::len),
            self.sentiment.as_ref().map(Vec::len),
            self.absa.as_ref().map(Vec::len),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0)
    }
}

/// Parse either one result object or a JSON array of them
pub fn parse_results(value: &Value) -> Result<Vec<AnalysisResult>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| AnalysisResult::deserialize(item).map_err(Into::into))
            .collect(),
        other => Ok(vec![AnalysisResult::deserialize(other)?]),
    }
}

/// One concept found in a sub-text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptMention {
    /// Normalized concept name
    pub concept: String,
    /// Number of mentions
    pub freq: u64,
    /// Relevance for the sub-text
    #[serde(default)]
    pub relevance_score: Option<f64>,
    /// Type tag
    #[serde(rename = "type")]
    pub concept_type: String,
    /// Surface forms of the mentions
    #[serde(default)]
    pub surface: Option<Vec<Surface>>,
}

/// Text span as it appears in the analyzed sub-text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    /// Matched text
    pub surface_string: String,
    /// `[start, end)` character offsets
    pub span: (usize, usize),
}

impl Surface {
    /// `"<start>-<end>"` representation stored in the tables
    #[must_use]
    pub fn text_span(&self) -> String {
        format!("{}-{}", self.span.0, self.span.1)
    }
}

/// Probability of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Category label
    #[serde(alias = "category")]
    pub label: String,
    /// Classifier probability
    pub probability: f64,
}

/// Sentiment of one sub-text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Sentiment score
    pub sentiment_value: f64,
}

/// ABSA analysis of one sub-text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsaText {
    /// Text after normalization
    #[serde(default)]
    pub normalized_text: String,
    /// Entity mentions
    #[serde(default)]
    pub entities: Vec<AbsaEntity>,
    /// Relations between opinions and entities
    #[serde(default)]
    pub relations: Vec<AbsaRelation>,
    /// Evaluations of entities
    #[serde(default)]
    pub evaluations: Vec<AbsaEvaluation>,
}

/// `{type, value}` pair naming an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySemantics {
    /// Type tag
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Normalized entity name
    pub value: String,
}

/// Entity mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsaEntity {
    /// Entities this mention resolves to
    pub semantics: Vec<EntitySemantics>,
    /// Where the mention occurs
    #[serde(default)]
    pub surface: Option<Surface>,
}

/// Relation between an opinion and entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsaRelation {
    /// True when the relation targets an entity outside the sub-text
    #[serde(default)]
    pub external_entity: bool,
    /// Relation content
    pub semantics: RelationSemantics,
    /// Where the relation occurs
    #[serde(default)]
    pub surface: Option<Surface>,
}

/// Content of a relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSemantics {
    /// Related entities
    #[serde(default)]
    pub entity: Vec<EntitySemantics>,
    /// Who holds the opinion
    #[serde(default)]
    pub opinion_holder: Option<String>,
    /// Restriction of the opinion
    #[serde(default)]
    pub restriction: Option<String>,
    /// Sentiment score
    pub sentiment_value: f64,
}

/// Evaluation of entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsaEvaluation {
    /// Evaluation content
    pub semantics: EvaluationSemantics,
    /// Where the evaluation occurs
    #[serde(default)]
    pub surface: Option<Surface>,
}

/// Content of an evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSemantics {
    /// Evaluated entities
    #[serde(default)]
    pub entity: Vec<EntitySemantics>,
    /// Sentiment score
    pub sentiment_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_and_list() {
        let single = json!({"sentiment": [{"sentiment_value": 0.5}]});
        assert_eq!(parse_results(&single).unwrap().len(), 1);

        let list = json!([single.clone(), single]);
        assert_eq!(parse_results(&list).unwrap().len(), 2);
    }

    #[test]
    fn test_optional_concept_fields() {
        let value = json!({"concepts": [[{"concept": "Lenovo", "freq": 1, "type": "brand"}]]});
        let result = &parse_results(&value).unwrap()[0];
        let mention = &result.concepts.as_ref().unwrap()[0][0];
        assert_eq!(mention.relevance_score, None);
        assert_eq!(mention.surface, None);
    }

    #[test]
    fn test_missing_required_field_is_shape_error() {
        let value = json!({"concepts": [[{"freq": 1, "type": "brand"}]]});
        let err = parse_results(&value).unwrap_err();
        assert!(matches!(err, crate::error::AnalyticsError::DataShape(_)));
    }

    #[test]
    fn test_fragment_count_takes_longest_list() {
        let value = json!({
            "categories": [[], [], []],
            "sentiment": [{"sentiment_value": 1.0}],
        });
        assert_eq!(parse_results(&value).unwrap()[0].fragment_count(), 3);
    }
}

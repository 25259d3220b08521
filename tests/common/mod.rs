//! Fixtures shared by the integration tests

#![allow(dead_code)]

use doc_analytics::models::{
    AbsaEntityRow, AbsaEvaluationEntityRow, AbsaEvaluationRow, AbsaNormalizedTextRow,
    AbsaRelationEntityRow, AbsaRelationRow, ConceptRow,
};
use doc_analytics::{AbsaDataset, ConceptsDataset};
use serde_json::{json, Value};

/// Two single-concept sub-texts with surface strings
pub fn concepts() -> Value {
    json!([
        [
            {
                "concept": "Lenovo",
                "surface": [{"surface_string": "lenovo", "span": [0, 6]}],
                "freq": 1,
                "relevance_score": 1.0,
                "type": "brand"
            }
        ],
        [
            {
                "concept": "Samsung",
                "surface": [{"surface_string": "samsung", "span": [0, 7]}],
                "freq": 1,
                "relevance_score": 1.0,
                "type": "brand"
            }
        ]
    ])
}

/// Same concepts without the optional fields
pub fn concepts_reduced() -> Value {
    json!([
        [{"concept": "Lenovo", "freq": 1, "type": "brand"}],
        [{"concept": "Samsung", "freq": 1, "type": "brand"}]
    ])
}

pub fn sentiments() -> Value {
    json!([
        {"sentiment_value": 0.7299562892999195},
        {"sentiment_value": 0.6668725094407698}
    ])
}

/// Two sub-texts, thirty labels each
pub fn categories() -> Value {
    json!([
        [
            {"label": "camera", "probability": 0.44475978426332685},
            {"label": "travel", "probability": 0.2279223877672652},
            {"label": "hr", "probability": 0.09173477160494019},
            {"label": "auto", "probability": 0.06708061556120234},
            {"label": "fashion", "probability": 0.025414852323138004},
            {"label": "finance", "probability": 0.018507594185656784},
            {"label": "food", "probability": 0.010119412627783536},
            {"label": "law", "probability": 0.00965379302613669},
            {"label": "education", "probability": 0.009582090685450925},
            {"label": "ce", "probability": 0.009340358982552241},
            {"label": "furniture", "probability": 0.008684932567501653},
            {"label": "internet", "probability": 0.00778506882501582},
            {"label": "babies", "probability": 0.007096874411645032},
            {"label": "fitness", "probability": 0.0069576834053539675},
            {"label": "health", "probability": 0.006145046000728843},
            {"label": "sports", "probability": 0.006031221668762928},
            {"label": "entertainment", "probability": 0.005231272080964669},
            {"label": "mobile", "probability": 0.004967572280467443},
            {"label": "beauty", "probability": 0.00494888795526646},
            {"label": "realestate", "probability": 0.004493574861362339},
            {"label": "energy", "probability": 0.0040505145283132385},
            {"label": "airline", "probability": 0.003390457074009262},
            {"label": "art", "probability": 0.0028687491478624947},
            {"label": "architecture", "probability": 0.002822605573936816},
            {"label": "music", "probability": 0.0027084020379582676},
            {"label": "hotel", "probability": 0.002295792656008564},
            {"label": "appliances", "probability": 0.002193479986584827},
            {"label": "books", "probability": 0.001483402884988822},
            {"label": "games", "probability": 0.0010261026838245006},
            {"label": "business", "probability": 0.0007026983419913149}
        ],
        [
            {"label": "games", "probability": 0.39789969578523887},
            {"label": "travel", "probability": 0.11634739448945783},
            {"label": "fashion", "probability": 0.09168535069430538},
            {"label": "law", "probability": 0.04323751076891663},
            {"label": "auto", "probability": 0.041857526739422356},
            {"label": "airline", "probability": 0.035446480105636335},
            {"label": "ce", "probability": 0.03478883675405762},
            {"label": "camera", "probability": 0.02719330000509693},
            {"label": "food", "probability": 0.024219656311877134},
            {"label": "finance", "probability": 0.02301679246976262},
            {"label": "education", "probability": 0.022459608009340545},
            {"label": "architecture", "probability": 0.017837572573750626},
            {"label": "beauty", "probability": 0.015451481313075766},
            {"label": "fitness", "probability": 0.014332460323421978},
            {"label": "babies", "probability": 0.011144662880568099},
            {"label": "health", "probability": 0.010945923020829255},
            {"label": "furniture", "probability": 0.010466338721162467},
            {"label": "hr", "probability": 0.009210314423265968},
            {"label": "mobile", "probability": 0.008598212480182528},
            {"label": "music", "probability": 0.008036079511276282},
            {"label": "internet", "probability": 0.006370603094547427},
            {"label": "hotel", "probability": 0.005955447551681576},
            {"label": "realestate", "probability": 0.005121969573881132},
            {"label": "entertainment", "probability": 0.004570734302611687},
            {"label": "energy", "probability": 0.00424202672617446},
            {"label": "appliances", "probability": 0.004177990415535009},
            {"label": "art", "probability": 0.0021153603845123245},
            {"label": "books", "probability": 0.0013904052961039273},
            {"label": "sports", "probability": 0.0010192722188369773},
            {"label": "business", "probability": 0.0008609930554701703}
        ]
    ])
}

/// Two ABSA sub-texts in Chinese
pub fn absa() -> Value {
    json!([
        {
            "entities": [
                {
                    "semantics": [{"type": "feature_subjective", "value": "OperationQuality"}],
                    "surface": {"span": [2, 4], "surface_string": "性能"}
                }
            ],
            "evaluations": [
                {
                    "semantics": {
                        "entity": [{"type": "feature_quantitative", "value": "Safety"}],
                        "sentiment_value": 2.0
                    },
                    "surface": {"span": [0, 2], "surface_string": "安全"}
                },
                {
                    "semantics": {
                        "entity": [{"type": "feature_subjective", "value": "VisualAppearance"}],
                        "sentiment_value": 3.5
                    },
                    "surface": {"span": [7, 10], "surface_string": "很帅气"}
                }
            ],
            "normalized_text": "安全性能很好，很帅气。",
            "relations": [
                {
                    "external_entity": false,
                    "semantics": {
                        "entity": [
                            {"type": "feature_quantitative", "value": "Safety"},
                            {"type": "feature_subjective", "value": "OperationQuality"}
                        ],
                        "opinion_holder": null,
                        "restriction": null,
                        "sentiment_value": 2.0
                    },
                    "surface": {"span": [0, 4], "surface_string": "安全性能"}
                }
            ]
        },
        {
            "entities": [
                {
                    "semantics": [{"type": "feature_subjective", "value": "OperationQuality"}],
                    "surface": {"span": [0, 2], "surface_string": "性能"}
                }
            ],
            "evaluations": [],
            "relations": [],
            "normalized_text": "性能"
        }
    ])
}

/// One result object holding every analysis kind
pub fn analysis() -> Value {
    json!({
        "concepts": concepts(),
        "categories": categories(),
        "sentiment": sentiments(),
        "absa": absa()
    })
}

pub fn concept(
    doc_id: u64,
    text_order: u64,
    name: &str,
    freq: u64,
    relevance: f64,
    concept_type: &str,
) -> ConceptRow {
    ConceptRow {
        doc_id,
        text_order,
        concept: name.to_string(),
        freq,
        relevance_score: Some(relevance),
        concept_type: concept_type.to_string(),
    }
}

/// Four concept rows over two sub-texts of one document
pub fn concepts_dataset() -> ConceptsDataset {
    ConceptsDataset::new(
        Some(vec![
            concept(0, 0, "Lenovo", 1, 0.4, "brand"),
            concept(0, 1, "Samsung", 1, 0.5, "brand"),
            concept(0, 1, "Lenovo", 2, 1.0, "brand"),
            concept(0, 1, "VisualAppearance", 2, 0.1, "feature"),
        ]),
        None,
    )
}

/// Concepts spread over five documents for idf checks
pub fn idf_dataset() -> ConceptsDataset {
    ConceptsDataset::new(
        Some(vec![
            concept(0, 0, "Lenovo", 1, 0.9, "brand"),
            concept(0, 0, "BMW", 1, 1.0, "brand"),
            concept(1, 0, "Samsung", 1, 0.33, "brand"),
            concept(1, 0, "Lenovo", 1, 0.89, "brand"),
            concept(2, 0, "Lenovo", 2, 0.45, "brand"),
            concept(2, 1, "VisualAppearance", 2, 0.99, "feature"),
            concept(3, 0, "VisualAppearance", 2, 0.121, "feature"),
        ]),
        None,
    )
}

/// Dated concepts for time-series checks
pub fn time_dataset() -> ConceptsDataset {
    ConceptsDataset::new(
        Some(vec![
            concept(0, 0, "Lenovo", 1, 1.0, "brand"),
            concept(0, 0, "BMW", 1, 1.0, "brand"),
            concept(1, 0, "Samsung", 1, 1.0, "brand"),
            concept(1, 0, "Lenovo", 1, 1.0, "brand"),
            concept(2, 0, "Lenovo", 2, 1.0, "brand"),
            concept(3, 0, "Samsung", 2, 1.0, "brand"),
            concept(3, 1, "Lenovo", 1, 1.0, "brand"),
            concept(4, 0, "Samsung", 10, 1.0, "brand"),
            concept(4, 0, "Lenovo", 10, 1.0, "brand"),
        ]),
        None,
    )
}

fn entity(text_order: u64, name: &str, entity_type: &str, surface: &str, span: &str) -> AbsaEntityRow {
    AbsaEntityRow {
        doc_id: 0,
        text_order,
        entity_name: name.to_string(),
        entity_type: entity_type.to_string(),
        surface_string: Some(surface.to_string()),
        text_span: Some(span.to_string()),
    }
}

fn relation(text_order: u64, relation_id: u64, value: f64, surface: &str, span: &str) -> AbsaRelationRow {
    AbsaRelationRow {
        doc_id: 0,
        text_order,
        relation_id,
        opinion_holder: None,
        restriction: None,
        sentiment_value: value,
        is_external: false,
        surface_string: Some(surface.to_string()),
        text_span: Some(span.to_string()),
    }
}

fn relation_entity(text_order: u64, relation_id: u64, entity_type: &str, name: &str) -> AbsaRelationEntityRow {
    AbsaRelationEntityRow {
        doc_id: 0,
        text_order,
        relation_id,
        entity_type: entity_type.to_string(),
        entity_name: name.to_string(),
    }
}

fn evaluation(text_order: u64, evaluation_id: u64, value: f64, surface: &str, span: &str) -> AbsaEvaluationRow {
    AbsaEvaluationRow {
        doc_id: 0,
        text_order,
        evaluation_id,
        sentiment_value: value,
        surface_string: Some(surface.to_string()),
        text_span: Some(span.to_string()),
    }
}

fn evaluation_entity(text_order: u64, evaluation_id: u64, entity_type: &str, name: &str) -> AbsaEvaluationEntityRow {
    AbsaEvaluationEntityRow {
        doc_id: 0,
        text_order,
        evaluation_id,
        entity_type: entity_type.to_string(),
        entity_name: name.to_string(),
    }
}

/// ABSA tables over two sub-texts of one document
pub fn absa_dataset() -> AbsaDataset {
    AbsaDataset::new(
        Some(vec![
            entity(0, "Lenovo", "brand", "lenovo", "4-9"),
            entity(1, "VisualAppearance", "feature_subjective", "looks", "0-4"),
            entity(1, "Samsung", "brand", "samsung", "15-21"),
            entity(1, "Lenovo", "brand", "Lenovo", "154-159"),
            entity(1, "Lenovo", "brand", "Lenovo", "210-215"),
            entity(1, "VisualAppearance", "feature_subjective", "looks", "30-34"),
        ]),
        Some(vec![
            AbsaNormalizedTextRow {
                doc_id: 0,
                text_order: 0,
                normalized_text: "Hey lenovo".to_string(),
            },
            AbsaNormalizedTextRow {
                doc_id: 0,
                text_order: 1,
                normalized_text: "安全性能很好，很帅气。".to_string(),
            },
        ]),
        Some(vec![
            relation(0, 0, 2.0, "安全", "0-2"),
            relation(0, 1, 3.5, "很帅气", "7-10"),
            relation(1, 0, 1.0, "安全", "0-2"),
            relation(1, 1, 2.5, "很帅气", "7-10"),
        ]),
        Some(vec![
            relation_entity(0, 0, "feature_quantitative", "Safety"),
            relation_entity(0, 0, "feature_objective", "Hardiness"),
            relation_entity(0, 1, "feature_subjective", "VisualAppearance"),
            relation_entity(1, 0, "feature_quantitative", "Safety"),
            relation_entity(1, 1, "feature_subjective", "VisualAppearance"),
        ]),
        Some(vec![
            evaluation(0, 0, 2.0, "安全", "0-2"),
            evaluation(0, 1, 3.5, "很帅气", "7-10"),
            evaluation(1, 0, 1.0, "安全", "0-2"),
            evaluation(1, 1, 2.5, "很帅气", "7-10"),
        ]),
        Some(vec![
            evaluation_entity(0, 0, "feature_quantitative", "Safety"),
            evaluation_entity(0, 1, "feature_subjective", "VisualAppearance"),
            evaluation_entity(1, 0, "feature_quantitative", "Safety"),
            evaluation_entity(1, 1, "feature_subjective", "VisualAppearance"),
        ]),
    )
}

/// Approximate float equality for aggregation results
pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
    }
}

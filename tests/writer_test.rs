//! Tests for converting raw analysis results into table rows

mod common;

use doc_analytics::api::{AbsaText, CategoryScore, ConceptMention, SentimentScore};
use doc_analytics::models::{
    AbsaEntityRow, AbsaRelationEntityRow, AbsaRelationRow, CategoryRow, ConceptRow,
    ConceptSurfaceRow, SentimentRow, TableName,
};
use doc_analytics::{parse_results, AnalyticsError, Writer};

fn concepts() -> Vec<Vec<ConceptMention>> {
    serde_json::from_value(common::concepts()).unwrap()
}

fn categories() -> Vec<Vec<CategoryScore>> {
    serde_json::from_value(common::categories()).unwrap()
}

fn sentiments() -> Vec<SentimentScore> {
    serde_json::from_value(common::sentiments()).unwrap()
}

fn absa() -> Vec<AbsaText> {
    serde_json::from_value(common::absa()).unwrap()
}

#[test]
fn test_id_increase_per_document() {
    let mut writer = Writer::starting_at(5);
    let _ = writer.write_concepts(&concepts(), false);
    assert_eq!(writer.next_id(), 7);
    let _ = writer.write_categories(&categories(), true);
    assert_eq!(writer.next_id(), 8);
    let _ = writer.write_absa(&absa(), false);
    assert_eq!(writer.next_id(), 10);
}

#[test]
fn test_concepts_many_documents() {
    let mut writer = Writer::starting_at(1);
    let tables = writer.write_concepts(&concepts(), false);
    let rows = tables.rows::<ConceptRow>().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].doc_id, rows[0].text_order), (1, 0));
    assert_eq!(rows[0].concept, "Lenovo");
    assert_eq!(rows[0].relevance_score, Some(1.0));
    assert_eq!(rows[0].concept_type, "brand");
    assert_eq!((rows[1].doc_id, rows[1].text_order), (2, 0));
    assert_eq!(rows[1].concept, "Samsung");

    let surfaces = tables.rows::<ConceptSurfaceRow>().unwrap();
    assert_eq!(surfaces[0].surface_string, "lenovo");
    assert_eq!(surfaces[0].text_span, "0-6");
    assert_eq!(surfaces[1].text_span, "0-7");
}

#[test]
fn test_concepts_one_document() {
    let mut writer = Writer::starting_at(1);
    let tables = writer.write_concepts(&concepts(), true);
    let rows = tables.rows::<ConceptRow>().unwrap();
    assert_eq!((rows[0].doc_id, rows[0].text_order), (1, 0));
    assert_eq!((rows[1].doc_id, rows[1].text_order), (1, 1));
    assert_eq!(writer.next_id(), 2);
}

#[test]
fn test_concepts_without_optional_fields() {
    let reduced: Vec<Vec<ConceptMention>> =
        serde_json::from_value(common::concepts_reduced()).unwrap();
    let tables = Writer::new().write_concepts(&reduced, false);
    let rows = tables.rows::<ConceptRow>().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.relevance_score.is_none()));
    assert!(!tables.contains(TableName::ConceptsSurfaceStrings));
}

#[test]
fn test_categories_many_documents() {
    let tables = Writer::starting_at(10).write_categories(&categories(), false);
    let rows = tables.rows::<CategoryRow>().unwrap();
    assert_eq!(rows.len(), 60);
    let mut ids: Vec<u64> = rows.iter().map(|row| row.doc_id).collect();
    ids.dedup();
    assert_eq!(ids, vec![10, 11]);
    assert!(rows.iter().all(|row| row.text_order == 0));
}

#[test]
fn test_categories_one_document() {
    let first = &categories()[..1];
    let tables = Writer::starting_at(20).write_categories(first, true);
    let rows = tables.rows::<CategoryRow>().unwrap();
    assert_eq!(rows.len(), 30);
    assert!(rows.iter().all(|row| row.doc_id == 20 && row.text_order == 0));
}

#[test]
fn test_sentiment_many_documents() {
    let tables = Writer::starting_at(3).write_sentiment(&sentiments(), false);
    let rows = tables.rows::<SentimentRow>().unwrap();
    assert_eq!((rows[0].doc_id, rows[0].text_order), (3, 0));
    assert_eq!(rows[0].sentiment_value, 0.7299562892999195);
    assert_eq!((rows[1].doc_id, rows[1].text_order), (4, 0));
    assert_eq!(rows[1].sentiment_value, 0.6668725094407698);
}

#[test]
fn test_sentiment_one_document() {
    let tables = Writer::starting_at(2).write_sentiment(&sentiments(), true);
    let rows = tables.rows::<SentimentRow>().unwrap();
    assert_eq!((rows[0].doc_id, rows[0].text_order), (2, 0));
    assert_eq!((rows[1].doc_id, rows[1].text_order), (2, 1));
}

#[test]
fn test_absa_many_documents() {
    let tables = Writer::starting_at(77).write_absa(&absa(), false);
    let entities = tables.rows::<AbsaEntityRow>().unwrap();
    assert_eq!(
        entities[0],
        AbsaEntityRow {
            doc_id: 77,
            text_order: 0,
            entity_name: "OperationQuality".to_string(),
            entity_type: "feature_subjective".to_string(),
            surface_string: Some("性能".to_string()),
            text_span: Some("2-4".to_string()),
        }
    );
    assert_eq!((entities[1].doc_id, entities[1].text_order), (78, 0));
    assert_eq!(entities[1].text_span.as_deref(), Some("0-2"));

    let relations = tables.rows::<AbsaRelationRow>().unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0].relation_id, 0);
    assert_eq!(relations[0].opinion_holder, None);
    assert!(!relations[0].is_external);
    assert_eq!(relations[0].surface_string.as_deref(), Some("安全性能"));

    let linked = tables.rows::<AbsaRelationEntityRow>().unwrap();
    let names: Vec<&str> = linked.iter().map(|row| row.entity_name.as_str()).collect();
    assert_eq!(names, ["Safety", "OperationQuality"]);
}

#[test]
fn test_absa_one_document() {
    let tables = Writer::starting_at(80).write_absa(&absa(), true);
    let entities = tables.rows::<AbsaEntityRow>().unwrap();
    assert_eq!((entities[0].doc_id, entities[0].text_order), (80, 0));
    assert_eq!((entities[1].doc_id, entities[1].text_order), (80, 1));
}

#[test]
fn test_write_analysis_shares_ids_across_kinds() {
    let results = parse_results(&common::analysis()).unwrap();
    let mut writer = Writer::new();
    let tables = writer.write_analysis(&results[0], false);
    assert_eq!(writer.next_id(), 2);

    let concept_ids: Vec<u64> = tables
        .rows::<ConceptRow>()
        .unwrap()
        .iter()
        .map(|row| row.doc_id)
        .collect();
    let sentiment_ids: Vec<u64> = tables
        .rows::<SentimentRow>()
        .unwrap()
        .iter()
        .map(|row| row.doc_id)
        .collect();
    assert_eq!(concept_ids, sentiment_ids);
    assert_eq!(tables.names().len(), TableName::ALL.len());
}

#[test]
fn test_write_analysis_single_document_consumes_one_id() {
    let results = parse_results(&common::analysis()).unwrap();
    let mut writer = Writer::starting_at(4);
    let tables = writer.write_analysis(&results[0], true);
    assert_eq!(writer.next_id(), 5);
    assert!(tables
        .rows::<CategoryRow>()
        .unwrap()
        .iter()
        .all(|row| row.doc_id == 4));
}

#[test]
fn test_missing_required_field_is_data_shape_error() {
    let err = parse_results(&serde_json::json!({"concepts": [[{"freq": 1, "type": "brand"}]]}))
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::DataShape(_)));
}

#[test]
fn test_independent_writers_do_not_interfere() {
    let mut first = Writer::new();
    let mut second = Writer::new();
    let _ = first.write_sentiment(&sentiments(), false);
    let tables = second.write_sentiment(&sentiments(), false);
    assert_eq!(tables.rows::<SentimentRow>().unwrap()[0].doc_id, 0);
    assert_eq!(first.next_id(), 2);
}

//! Tests for category and sentiment aggregations

mod common;

use common::assert_close;
use doc_analytics::dataset::codes;
use doc_analytics::models::{CategoryRow, SentimentRow};
use doc_analytics::{DatasetLoader, SentimentDataset};

fn sentiment(doc_id: u64, text_order: u64, sentiment_value: f64) -> SentimentRow {
    SentimentRow {
        doc_id,
        text_order,
        sentiment_value,
    }
}

#[test]
fn test_aggregated_categories() {
    let loader = DatasetLoader::from_api_result(&serde_json::json!({
        "categories": common::categories()
    }))
    .unwrap();
    let series = loader.categories().unwrap().categories().unwrap();

    assert_eq!(series.plot_id(), codes::AGGREGATED_CATEGORIES);
    assert_eq!(series.index_name(), "Category");
    assert_eq!(series.len(), 30);
    assert_eq!(&series.labels()[..3], ["camera", "games", "travel"]);
    assert_close(
        &series.values()[..1],
        &[0.44475978426332685 + 0.02719330000509693],
    );
    let total: f64 = series.values().iter().sum();
    assert!((total - 2.0).abs() < 1e-6);
}

#[test]
fn test_main_category() {
    let loader = DatasetLoader::from_api_result(&serde_json::json!({
        "categories": common::categories()
    }))
    .unwrap();
    assert_eq!(
        loader.categories().unwrap().main_category().unwrap().as_deref(),
        Some("camera")
    );
}

#[test]
fn test_categories_of_one_row() {
    let dataset = doc_analytics::CategoriesDataset::new(Some(vec![CategoryRow {
        doc_id: 0,
        text_order: 0,
        category: "auto".to_string(),
        probability: 1.0,
    }]));
    assert_eq!(dataset.main_category().unwrap().as_deref(), Some("auto"));
}

#[test]
fn test_average_sentiment() {
    let dataset = SentimentDataset::new(Some(vec![
        sentiment(0, 0, 0.7299562892999195),
        sentiment(1, 0, 0.6668725094407698),
    ]));
    assert_close(
        &[dataset.average_sentiment().unwrap()],
        &[(0.7299562892999195 + 0.6668725094407698) / 2.0],
    );
}

#[test]
fn test_opposite_sentiments_cancel_out() {
    let values = [0.5, -0.5, 0.5, -1.0, 1.0, 0.5, -0.5, -0.5];
    let rows = (0u64..).zip(values).map(|(doc_id, value)| sentiment(doc_id, 0, value));
    let dataset = SentimentDataset::new(Some(rows.collect()));
    assert_close(&[dataset.average_sentiment().unwrap()], &[0.0]);
}

#[test]
fn test_sentiment_without_table() {
    let dataset = SentimentDataset::new(None);
    assert!(!dataset.has_data());
    assert!(dataset.average_sentiment().unwrap_err().is_no_relevant_data());
}

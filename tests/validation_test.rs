//! Comprehensive unit tests for validation.rs module

use chrono::{Duration, NaiveDate};
use std::path::Path;
use tempfile::TempDir;

use doc_analytics::validation::InputValidator;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, month, day).unwrap()
}

#[test]
fn test_validate_directory_existing() {
    let dir = TempDir::new().unwrap();
    assert!(InputValidator::validate_directory(dir.path()).is_ok());
}

#[test]
fn test_validate_directory_not_yet_created() {
    let dir = TempDir::new().unwrap();
    assert!(InputValidator::validate_directory(&dir.path().join("tables")).is_ok());
}

#[test]
fn test_validate_directory_empty() {
    assert!(InputValidator::validate_directory(Path::new("")).is_err());
}

#[test]
fn test_validate_directory_is_a_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("concepts.csv");
    std::fs::write(&file, "doc_id\n").unwrap();
    assert!(InputValidator::validate_directory(&file).is_err());
}

#[test]
fn test_validate_directory_too_long() {
    let long = "a".repeat(4097);
    assert!(InputValidator::validate_directory(Path::new(&long)).is_err());
}

#[test]
fn test_validate_backup_token_valid() {
    assert!(InputValidator::validate_backup_token("backup").is_ok());
    assert!(InputValidator::validate_backup_token("20161206").is_ok());
}

#[test]
fn test_validate_backup_token_empty() {
    assert!(InputValidator::validate_backup_token("").is_err());
}

#[test]
fn test_validate_backup_token_too_long() {
    assert!(InputValidator::validate_backup_token(&"a".repeat(64)).is_ok());
    assert!(InputValidator::validate_backup_token(&"a".repeat(65)).is_err());
}

#[test]
fn test_validate_backup_token_with_separator() {
    assert!(InputValidator::validate_backup_token("../backup").is_err());
    assert!(InputValidator::validate_backup_token("back\\up").is_err());
    assert!(InputValidator::validate_backup_token("back\0up").is_err());
}

#[test]
fn test_validate_date_range_valid() {
    assert!(InputValidator::validate_date_range(date(1, 1), date(1, 21)).is_ok());
}

#[test]
fn test_validate_date_range_single_day() {
    assert!(InputValidator::validate_date_range(date(1, 1), date(1, 1)).is_ok());
}

#[test]
fn test_validate_date_range_reversed() {
    assert!(InputValidator::validate_date_range(date(2, 1), date(1, 1)).is_err());
}

#[test]
fn test_validate_window() {
    assert!(InputValidator::validate_window(Duration::days(7)).is_ok());
    assert!(InputValidator::validate_window(Duration::zero()).is_err());
    assert!(InputValidator::validate_window(Duration::days(-1)).is_err());
}

#[test]
fn test_validate_top_n() {
    assert!(InputValidator::validate_top_n(1).is_ok());
    assert!(InputValidator::validate_top_n(100_000).is_ok());
    assert!(InputValidator::validate_top_n(0).is_err());
    assert!(InputValidator::validate_top_n(100_001).is_err());
}

#[test]
fn test_sanitize_text_removes_control_chars() {
    assert_eq!(InputValidator::sanitize_text("bra\u{7}nd\n"), "brand");
}

#[test]
fn test_sanitize_text_trims_whitespace() {
    assert_eq!(InputValidator::sanitize_text("  feature_  "), "feature_");
}

#[test]
fn test_sanitize_text_keeps_unicode() {
    assert_eq!(InputValidator::sanitize_text("安全"), "安全");
}

//! Doc Analytics - Aggregation and Persistence of Text-Analysis Results
//!
//! A Rust library that flattens per-document results of a text-analysis
//! service into relational tables, stores and reloads them, and answers
//! analytical queries over them.
//!
//! # Features
//!
//! - Convert concept, category, sentiment and ABSA results into flat tables
//! - Keep tables in memory or in a directory of CSV files with backups
//! - Rank, filter and bucket concepts and ABSA entities
//! - Layered configuration and structured logging

/// Raw analysis result shapes
pub mod api;
/// Configuration management
pub mod config;
/// Query engines over the analysis tables
pub mod dataset;
/// Error types
pub mod error;
/// Composite loader building query engines
pub mod loader;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Table rows and table sets
pub mod models;
/// In-memory and CSV storage backends
pub mod storage;
/// Input validation and sanitization
pub mod validation;
/// Conversion of results into table rows
pub mod writer;

// Re-export key components for easier access
pub use api::{parse_results, AnalysisResult};
pub use dataset::{AbsaDataset, CategoriesDataset, ConceptsDataset, SentimentDataset, Series};
pub use error::{AnalyticsError, Result};
pub use loader::DatasetLoader;
pub use models::{TableName, TableSet, TableView};
pub use storage::{backup, CsvWriter, MemoryWriter, TableSink, TableSource};
pub use writer::Writer;

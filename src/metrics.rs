use anyhow::Result;
use metrics::{counter, histogram};
use std::sync::OnceLock;
use std::time::Duration;

use crate::models::TableName;

/// Metric names emitted by the writers and the loader
pub struct MetricsCollector {
    // Writer metrics
    /// Rows appended, labeled by table
    pub rows_written_total: &'static str,
    /// Write calls that produced rows, labeled by table
    pub write_batches_total: &'static str,

    // Storage metrics
    /// Table files read back
    pub tables_loaded_total: &'static str,
    /// Seconds spent loading a directory
    pub load_duration: &'static str,
    /// Files renamed by backups
    pub backups_total: &'static str,

    // Query metrics
    /// Aggregation queries, labeled by plot id
    pub queries_total: &'static str,
    /// Queries that failed for lack of data
    pub no_data_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            rows_written_total: "doc_analytics_rows_written_total",
            write_batches_total: "doc_analytics_write_batches_total",

            tables_loaded_total: "doc_analytics_tables_loaded_total",
            load_duration: "doc_analytics_load_duration_seconds",
            backups_total: "doc_analytics_backups_total",

            queries_total: "doc_analytics_queries_total",
            no_data_total: "doc_analytics_no_relevant_data_total",
        }
    }
}

/// Process-wide collector
pub fn global() -> &'static MetricsCollector {
    static COLLECTOR: OnceLock<MetricsCollector> = OnceLock::new();
    COLLECTOR.get_or_init(MetricsCollector::default)
}

impl MetricsCollector {
    /// Initialize metrics collection
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Rows appended to a table by a sink
    pub fn record_rows_written(&self, table: TableName, rows: usize) {
        counter!(self.rows_written_total, "table" => table.as_str()).increment(rows as u64);
        counter!(self.write_batches_total, "table" => table.as_str()).increment(1);
    }

    /// One table read from storage
    pub fn record_table_loaded(&self, table: TableName) {
        counter!(self.tables_loaded_total, "table" => table.as_str()).increment(1);
    }

    /// Time spent loading a directory of tables
    pub fn record_load_duration(&self, duration: Duration) {
        histogram!(self.load_duration).record(duration.as_secs_f64());
    }

    /// Files renamed by a backup pass
    pub fn record_backups(&self, files: usize) {
        counter!(self.backups_total).increment(files as u64);
    }

    /// One aggregation query, tagged with its plot id
    pub fn record_query(&self, plot_id: &'static str, found_data: bool) {
        counter!(self.queries_total, "query" => plot_id).increment(1);
        if !found_data {
            counter!(self.no_data_total, "query" => plot_id).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.rows_written_total, "doc_analytics_rows_written_total");
    }

    #[test]
    fn test_recording_without_recorder_is_harmless() {
        let collector = global();
        collector.record_rows_written(TableName::Concepts, 3);
        collector.record_backups(0);
        collector.record_query("Categories", false);
    }
}

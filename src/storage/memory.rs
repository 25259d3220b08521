//! In-memory table store

use tracing::debug;

use super::{TableSink, TableSource};
use crate::error::{AnalyticsError, Result};
use crate::metrics;
use crate::models::{TableName, TableSet, TableView};
use crate::writer::Writer;

/// Accumulates every table in memory, appending across write calls
#[derive(Debug, Default)]
pub struct MemoryWriter {
    writer: Writer,
    tables: TableSet,
    closed: bool,
}

impl MemoryWriter {
    /// Empty store with a fresh id counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store continuing the given id state
    #[must_use]
    pub fn with_writer(writer: Writer) -> Self {
        Self {
            writer,
            ..Self::default()
        }
    }

    /// Accumulated tables
    #[must_use]
    pub const fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// One accumulated table by name
    #[must_use]
    pub fn table(&self, name: TableName) -> Option<TableView<'_>> {
        self.tables.view(name)
    }

    /// Take ownership of the accumulated tables
    #[must_use]
    pub fn into_tables(self) -> TableSet {
        self.tables
    }

    /// True once [`TableSink::close`] was called
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

impl TableSink for MemoryWriter {
    fn init(&mut self) -> Result<()> {
        self.tables = TableSet::new();
        self.closed = false;
        Ok(())
    }

    fn writer_mut(&mut self) -> &mut Writer {
        &mut self.writer
    }

    fn write_tables(&mut self, tables: TableSet) -> Result<()> {
        if self.closed {
            return Err(AnalyticsError::InvalidArgument(
                "cannot write to a closed memory store".to_string(),
            ));
        }
        for name in tables.names() {
            if let Some(view) = tables.view(name) {
                debug!(table = %name, rows = view.len(), "Appending rows in memory");
                metrics::global().record_rows_written(name, view.len());
            }
        }
        self.tables.append(tables);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

impl TableSource for MemoryWriter {
    fn load_tables(&self) -> Result<TableSet> {
        Ok(self.tables.clone())
    }
}

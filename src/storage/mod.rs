//! Persistence backends for writer output
//!
//! Both backends follow the same lifecycle: [`TableSink::init`], any number of
//! `write_*` calls accumulating rows per table, then [`TableSink::close`].
//! Once closed, a backend can hand its tables to
//! [`crate::loader::DatasetLoader::from_writer`] through [`TableSource`].

mod delimited;
mod memory;

pub use delimited::{locate_table_file, read_dir, read_table, CsvWriter};
pub use memory::MemoryWriter;

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::api::{AbsaText, AnalysisResult, CategoryScore, ConceptMention, SentimentScore};
use crate::error::{AnalyticsError, Result};
use crate::metrics;
use crate::models::TableSet;
use crate::writer::Writer;

/// `strftime` pattern of the suffix appended by [`backup`]
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Sink accepting converted row batches
///
/// Implementors only provide storage; conversion and id assignment are shared
/// through the provided methods.
pub trait TableSink {
    /// Prepare the sink for a new session
    fn init(&mut self) -> Result<()>;

    /// Id state used for conversions written to this sink
    fn writer_mut(&mut self) -> &mut Writer;

    /// Append converted tables
    fn write_tables(&mut self, tables: TableSet) -> Result<()>;

    /// Finish the session
    fn close(&mut self) -> Result<()>;

    /// Convert and append every kind of one result object
    fn write_analysis(&mut self, result: &AnalysisResult, single_document: bool) -> Result<()> {
        let tables = self.writer_mut().write_analysis(result, single_document);
        self.write_tables(tables)
    }

    /// Convert and append concept fragments, one document per fragment
    fn write_concepts(&mut self, concepts: &[Vec<ConceptMention>]) -> Result<()> {
        let tables = self.writer_mut().write_concepts(concepts, false);
        self.write_tables(tables)
    }

    /// Convert and append category fragments, one document per fragment
    fn write_categories(&mut self, categories: &[Vec<CategoryScore>]) -> Result<()> {
        let tables = self.writer_mut().write_categories(categories, false);
        self.write_tables(tables)
    }

    /// Convert and append sentiment fragments, one document per fragment
    fn write_sentiment(&mut self, sentiments: &[SentimentScore]) -> Result<()> {
        let tables = self.writer_mut().write_sentiment(sentiments, false);
        self.write_tables(tables)
    }

    /// Convert and append ABSA fragments, one document per fragment
    fn write_absa(&mut self, absa: &[AbsaText]) -> Result<()> {
        let tables = self.writer_mut().write_absa(absa, false);
        self.write_tables(tables)
    }
}

/// Backend whose accumulated tables can be read back
pub trait TableSource {
    /// Every table the backend holds
    fn load_tables(&self) -> Result<TableSet>;
}

/// Rename existing files in `dir` by appending a `_YYYYMMDDHHMMSS` suffix
///
/// Returns the new names of the files that were renamed; names that do not
/// exist are skipped. Fails without renaming anything when a target name is
/// already taken.
pub fn backup<S: AsRef<str>>(dir: &Path, file_names: &[S]) -> Result<Vec<String>> {
    backup_at(dir, file_names, Local::now().naive_local())
}

/// [`backup`] with an explicit timestamp
pub fn backup_at<S: AsRef<str>>(
    dir: &Path,
    file_names: &[S],
    at: NaiveDateTime,
) -> Result<Vec<String>> {
    let suffix = at.format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let mut pending = Vec::new();
    for name in file_names {
        let name = name.as_ref();
        if !dir.join(name).try_exists()? {
            debug!(file = name, "Nothing to back up");
            continue;
        }
        let target = format!("{name}_{suffix}");
        if dir.join(&target).try_exists()? {
            return Err(AnalyticsError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("backup {target} already exists in {}", dir.display()),
            )));
        }
        pending.push((name, target));
    }

    let mut renamed = Vec::with_capacity(pending.len());
    for (name, target) in pending {
        fs::rename(dir.join(name), dir.join(&target))?;
        info!(from = name, to = %target, "Backed up table file");
        renamed.push(target);
    }
    metrics::global().record_backups(renamed.len());
    Ok(renamed)
}

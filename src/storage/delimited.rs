//! Directory-of-CSV-files table store
//!
//! Each table lives in `<dir>/<table>.csv` with the canonical header row.
//! Files are opened on first write and stay open for the session, so rows from
//! successive write calls land in the same file.

use csv::WriterBuilder;
use regex::Regex;
use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use chrono::NaiveDateTime;

use super::{backup, TableSink, TableSource, BACKUP_TIMESTAMP_FORMAT};
use crate::config::StorageConfig;
use crate::error::{AnalyticsError, Result};
use crate::logging::OperationTimer;
use crate::metrics;
use crate::models::{
    AbsaEntityRow, AbsaEvaluationEntityRow, AbsaEvaluationRow, AbsaNormalizedTextRow,
    AbsaRelationEntityRow, AbsaRelationRow, CategoryRow, ConceptRow, ConceptSurfaceRow, Record,
    SentimentRow, TableName, TableSet,
};
use crate::writer::Writer;

/// Writes every table as a comma-separated file inside a target directory
pub struct CsvWriter {
    target_dir: PathBuf,
    backup_existing: bool,
    writer: Writer,
    files: BTreeMap<TableName, csv::Writer<File>>,
    closed: bool,
}

impl CsvWriter {
    /// Writer targeting `target_dir`, backing up existing files on init
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            backup_existing: true,
            writer: Writer::new(),
            files: BTreeMap::new(),
            closed: false,
        }
    }

    /// Writer configured from the storage section of the app config
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.data_dir).with_backup(config.backup_existing)
    }

    /// Choose whether `init` backs up files that already exist
    #[must_use]
    pub const fn with_backup(mut self, backup_existing: bool) -> Self {
        self.backup_existing = backup_existing;
        self
    }

    /// Continue numbering documents from an existing id state
    #[must_use]
    pub const fn with_writer(mut self, writer: Writer) -> Self {
        self.writer = writer;
        self
    }

    /// Directory holding the table files
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// True once [`TableSink::close`] was called and `init` has not run since
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn file(&mut self, table: TableName) -> Result<&mut csv::Writer<File>> {
        Ok(match self.files.entry(table) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(open_table(&self.target_dir, table)?),
        })
    }

    fn write_table<R: Record>(&mut self, tables: &TableSet) -> Result<()> {
        let Some(rows) = tables.rows::<R>() else {
            return Ok(());
        };
        let file = self.file(R::TABLE)?;
        for row in rows {
            file.serialize(row)?;
        }
        metrics::global().record_rows_written(R::TABLE, rows.len());
        Ok(())
    }
}

impl fmt::Debug for CsvWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvWriter")
            .field("target_dir", &self.target_dir)
            .field("backup_existing", &self.backup_existing)
            .field("writer", &self.writer)
            .field("open_tables", &self.files.keys().collect::<Vec<_>>())
            .field("closed", &self.closed)
            .finish()
    }
}

fn remove_tables(dir: &Path, file_names: &[String]) -> Result<usize> {
    let mut removed = 0;
    for name in file_names {
        let path = dir.join(name);
        if path.try_exists()? {
            fs::remove_file(&path)?;
            debug!(path = %path.display(), "Removed table file");
            removed += 1;
        }
    }
    Ok(removed)
}

fn open_table(dir: &Path, table: TableName) -> Result<csv::Writer<File>> {
    fs::create_dir_all(dir)?;
    let path = dir.join(table.file_name());
    let file = File::create(&path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(table.columns())?;
    debug!(path = %path.display(), "Opened table file");
    Ok(writer)
}

impl TableSink for CsvWriter {
    fn init(&mut self) -> Result<()> {
        fs::create_dir_all(&self.target_dir)?;
        self.files.clear();
        self.closed = false;
        let names: Vec<String> = TableName::ALL.iter().map(|t| t.file_name()).collect();
        if self.backup_existing {
            let backed_up = backup(&self.target_dir, &names)?;
            if !backed_up.is_empty() {
                info!(
                    dir = %self.target_dir.display(),
                    files = backed_up.len(),
                    "Backed up existing tables before writing"
                );
            }
        } else {
            // Tables this session never writes must not survive from the last one
            let removed = remove_tables(&self.target_dir, &names)?;
            if removed > 0 {
                warn!(
                    dir = %self.target_dir.display(),
                    files = removed,
                    "Removed existing tables without backup"
                );
            }
        }
        Ok(())
    }

    fn writer_mut(&mut self) -> &mut Writer {
        &mut self.writer
    }

    fn write_tables(&mut self, tables: TableSet) -> Result<()> {
        if self.closed {
            return Err(AnalyticsError::InvalidArgument(format!(
                "cannot write to closed CSV store at {}",
                self.target_dir.display()
            )));
        }
        self.write_table::<ConceptRow>(&tables)?;
        self.write_table::<ConceptSurfaceRow>(&tables)?;
        self.write_table::<CategoryRow>(&tables)?;
        self.write_table::<SentimentRow>(&tables)?;
        self.write_table::<AbsaEntityRow>(&tables)?;
        self.write_table::<AbsaNormalizedTextRow>(&tables)?;
        self.write_table::<AbsaRelationRow>(&tables)?;
        self.write_table::<AbsaRelationEntityRow>(&tables)?;
        self.write_table::<AbsaEvaluationRow>(&tables)?;
        self.write_table::<AbsaEvaluationEntityRow>(&tables)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        for (table, mut file) in std::mem::take(&mut self.files) {
            file.flush()?;
            debug!(table = %table, "Closed table file");
        }
        self.closed = true;
        info!(dir = %self.target_dir.display(), "Closed CSV writer");
        Ok(())
    }
}

impl TableSource for CsvWriter {
    fn load_tables(&self) -> Result<TableSet> {
        read_dir(&self.target_dir, None)
    }
}

/// Read all rows of one table file
pub fn read_table<R: Record>(path: &Path) -> Result<Vec<R>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<R>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(table = %R::TABLE, path = %path.display(), rows = rows.len(), "Read table file");
    Ok(rows)
}

fn read_into<R: Record>(tables: &mut TableSet, path: &Path) -> Result<()> {
    tables.insert(read_table::<R>(path)?);
    metrics::global().record_table_loaded(R::TABLE);
    Ok(())
}

/// Load every table found in `dir`
///
/// Without a token the live `<table>.csv` files are read. With a token, each
/// table is read from its most recent backup whose suffix contains the token.
/// Tables without a matching file stay absent.
pub fn read_dir(dir: &Path, backup_token: Option<&str>) -> Result<TableSet> {
    let timer = OperationTimer::new("read_dir");
    let mut tables = TableSet::new();
    for table in TableName::ALL {
        let Some(path) = locate_table_file(dir, table, backup_token)? else {
            continue;
        };
        match table {
            TableName::Concepts => read_into::<ConceptRow>(&mut tables, &path)?,
            TableName::ConceptsSurfaceStrings => {
                read_into::<ConceptSurfaceRow>(&mut tables, &path)?;
            }
            TableName::Categories => read_into::<CategoryRow>(&mut tables, &path)?,
            TableName::Sentiments => read_into::<SentimentRow>(&mut tables, &path)?,
            TableName::AbsaEntities => read_into::<AbsaEntityRow>(&mut tables, &path)?,
            TableName::AbsaNormalizedTexts => {
                read_into::<AbsaNormalizedTextRow>(&mut tables, &path)?;
            }
            TableName::AbsaRelations => read_into::<AbsaRelationRow>(&mut tables, &path)?,
            TableName::AbsaRelationsEntities => {
                read_into::<AbsaRelationEntityRow>(&mut tables, &path)?;
            }
            TableName::AbsaEvaluations => read_into::<AbsaEvaluationRow>(&mut tables, &path)?,
            TableName::AbsaEvaluationsEntities => {
                read_into::<AbsaEvaluationEntityRow>(&mut tables, &path)?;
            }
        }
    }
    info!(dir = %dir.display(), tables = tables.names().len(), "Loaded tables from directory");
    metrics::global().record_load_duration(timer.finish());
    Ok(tables)
}

/// File backing `table` inside `dir`, if any
///
/// With a backup token, candidates are `<table>.csv<suffix>` files whose
/// suffix contains the token; the latest `_YYYYMMDDHHMMSS` suffix wins, then
/// the latest modification time.
pub fn locate_table_file(
    dir: &Path,
    table: TableName,
    backup_token: Option<&str>,
) -> Result<Option<PathBuf>> {
    let file_name = table.file_name();
    let Some(token) = backup_token else {
        let path = dir.join(&file_name);
        return Ok(path.is_file().then_some(path));
    };

    let stamp = Regex::new(r"_(\d{14})$")
        .map_err(|e| AnalyticsError::Other(format!("Failed to compile backup regex: {e}")))?;
    let mut best: Option<(Option<NaiveDateTime>, SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(file = ?entry.file_name(), "Skipping file with non UTF-8 name");
            continue;
        };
        let Some(suffix) = name.strip_prefix(&file_name) else {
            continue;
        };
        if suffix.is_empty() || !suffix.contains(token) || !entry.file_type()?.is_file() {
            continue;
        }
        let stamped = stamp
            .captures(suffix)
            .and_then(|c| NaiveDateTime::parse_from_str(&c[1], BACKUP_TIMESTAMP_FORMAT).ok());
        let modified = entry.metadata()?.modified()?;
        let candidate = (stamped, modified, entry.path());
        if best
            .as_ref()
            .map_or(true, |current| (candidate.0, candidate.1) > (current.0, current.1))
        {
            best = Some(candidate);
        }
    }
    Ok(best.map(|(_, _, path)| path))
}

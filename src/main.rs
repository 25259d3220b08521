//! Command-line front end over the table store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use doc_analytics::config::AppConfig;
use doc_analytics::logging::{init_logging, OperationTimer};
use doc_analytics::metrics::MetricsCollector;
use doc_analytics::storage::{backup, CsvWriter, TableSink};
use doc_analytics::validation::InputValidator;
use doc_analytics::{parse_results, DatasetLoader, TableName};

/// Command-line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Operation to run
    #[command(subcommand)]
    command: Commands,
}

/// Available operations
#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON file of analysis results into CSV tables
    Ingest {
        /// JSON file holding one result object or a list of them
        #[arg(short, long)]
        input: PathBuf,

        /// Target directory (defaults to the configured data directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Treat every result as one document with many sub-texts
        #[arg(long)]
        single_document: bool,

        /// Overwrite existing tables without backing them up
        #[arg(long)]
        no_backup: bool,
    },
    /// Load stored tables and print summary aggregations
    Report {
        /// Directory holding the tables (defaults to the configured data directory)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Read the most recent backups whose suffix contains this token
        #[arg(short, long)]
        backup_token: Option<String>,

        /// Number of entries per ranking
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Restrict concept and entity rankings to this type prefix
        #[arg(short, long)]
        type_prefix: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rename table files by appending a timestamp suffix
    Backup {
        /// Directory holding the files (defaults to the configured data directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// File names to back up (defaults to every table file)
        files: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard flushes the log file on exit
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _guard = init_logging(
        Some(&config.get_log_level()),
        log_file,
        &config.logging.format,
    )?;
    if let Err(e) = MetricsCollector::init() {
        debug!("Metrics recorder not installed: {}", e);
    }

    info!("Starting doc-analytics");

    // Parse command line arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            input,
            output_dir,
            single_document,
            no_backup,
        } => ingest(&config, &input, output_dir, single_document, no_backup)?,
        Commands::Report {
            data_dir,
            backup_token,
            top,
            type_prefix,
            json,
        } => report(
            &config,
            data_dir,
            backup_token,
            top,
            type_prefix.as_deref(),
            json,
        )?,
        Commands::Backup { dir, files } => backup_files(&config, dir, files)?,
    }

    Ok(())
}

/// Convert a result file into CSV tables
fn ingest(
    config: &AppConfig,
    input: &Path,
    output_dir: Option<PathBuf>,
    single_document: bool,
    no_backup: bool,
) -> Result<()> {
    let timer = OperationTimer::new("ingest");
    let target = output_dir.unwrap_or_else(|| config.data_dir());
    InputValidator::validate_directory(&target)?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;
    let results = parse_results(&value)?;

    let mut writer =
        CsvWriter::new(&target).with_backup(config.storage.backup_existing && !no_backup);
    writer.init()?;
    for result in &results {
        writer.write_analysis(result, single_document)?;
    }
    writer.close()?;

    info!(
        results = results.len(),
        dir = %target.display(),
        "Ingested analysis results"
    );
    timer.finish();
    Ok(())
}

/// Print the headline aggregations of every analysis kind present
#[allow(clippy::print_stdout)]
fn report(
    config: &AppConfig,
    data_dir: Option<PathBuf>,
    backup_token: Option<String>,
    top: Option<usize>,
    type_prefix: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let dir = data_dir.unwrap_or_else(|| config.data_dir());
    let token = backup_token.or_else(|| config.storage.backup_suffix.clone());
    if let Some(token) = &token {
        InputValidator::validate_backup_token(token)?;
    }
    let n = top.unwrap_or(config.analysis.top_n);
    InputValidator::validate_top_n(n)?;
    let prefix = type_prefix
        .map(InputValidator::sanitize_text)
        .filter(|p| !p.is_empty());
    let prefix = prefix.as_deref();

    let loader = DatasetLoader::from_path(&dir, token.as_deref())?;
    let mut sections = Vec::new();
    let mut rare_concepts: Vec<String> = Vec::new();

    if loader.has_concepts() {
        match loader.concepts() {
            Ok(concepts) if loader.table(TableName::Concepts).is_some() => {
                sections.push(concepts.most_common_concepts(n, prefix, false)?);
                sections.push(concepts.least_common_concepts(n, prefix, false)?);
                let is_rare = concepts.make_idf_filter(config.analysis.idf_threshold, prefix)?;
                rare_concepts = concepts
                    .concept_frequencies(prefix)?
                    .labels()
                    .into_iter()
                    .filter(|concept| is_rare(*concept))
                    .map(str::to_string)
                    .collect();
                debug!(rare = rare_concepts.len(), "Concepts above idf threshold");
            }
            Ok(_) => warn!("Only surface strings were found for concepts"),
            Err(e) => warn!("Skipping concepts: {}", e),
        }
    }
    if loader.has_categories() {
        sections.push(loader.categories()?.categories()?);
    }
    if loader.has_absa() {
        let absa = loader.absa()?;
        match absa.most_common_entities(n, prefix, false) {
            Ok(series) => sections.push(series),
            Err(e) if e.is_no_relevant_data() => warn!("Skipping entity ranking: {}", e),
            Err(e) => return Err(e.into()),
        }
        match absa.best_rated_entities(n, prefix) {
            Ok(series) => sections.push(series),
            Err(e) if e.is_no_relevant_data() => warn!("Skipping entity ratings: {}", e),
            Err(e) => return Err(e.into()),
        }
    }
    let average_sentiment = if loader.has_sentiments() {
        Some(loader.sentiments()?.average_sentiment()?)
    } else {
        None
    };

    if as_json {
        let output = json!({
            "directory": dir.display().to_string(),
            "tables": loader.tables().names().iter().map(|name| name.as_str()).collect::<Vec<_>>(),
            "average_sentiment": average_sentiment,
            "rare_concepts": rare_concepts,
            "aggregations": sections,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Tables in {}:", dir.display());
        for name in loader.tables().names() {
            if let Some(view) = loader.table(name) {
                let (rows, columns) = view.shape();
                println!("  {name:<28} {rows:>8} rows x {columns} columns");
            }
        }
        if let Some(value) = average_sentiment {
            println!("\nAverage sentiment: {value:.4}");
        }
        if !rare_concepts.is_empty() {
            println!("\nRare concepts: {}", rare_concepts.join(", "));
        }
        for series in &sections {
            println!("\n{series}");
        }
    }
    Ok(())
}

/// Back up the named files, or every table file
#[allow(clippy::print_stdout)]
fn backup_files(config: &AppConfig, dir: Option<PathBuf>, files: Vec<String>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.data_dir());
    InputValidator::validate_directory(&dir)?;
    let files = if files.is_empty() {
        TableName::ALL.iter().map(|table| table.file_name()).collect()
    } else {
        files
    };

    let renamed = backup(&dir, &files)?;
    if renamed.is_empty() {
        warn!(dir = %dir.display(), "No files to back up");
    }
    for name in renamed {
        println!("{name}");
    }
    Ok(())
}

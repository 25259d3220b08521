use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log output settings
    pub logging: LoggingConfig,
    /// Where tables are written and read
    pub storage: StorageConfig,
    /// Defaults for aggregation queries
    pub analysis: AnalysisConfig,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter level when `RUST_LOG` is unset
    pub level: String,
    /// Optional rolling log file
    pub file_path: Option<String>,
    /// "json" or "text"
    pub format: String,
}

/// Table storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the CSV tables
    pub data_dir: String,
    /// Rename existing table files before a CSV writer overwrites them
    pub backup_existing: bool,
    /// Load from the latest backup containing this token instead of live files
    pub backup_suffix: Option<String>,
}

/// Aggregation defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of entries reported by ranking queries
    pub top_n: usize,
    /// Concepts whose idf exceeds this value count as rare
    pub idf_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                backup_existing: true,
                backup_suffix: None,
            },
            analysis: AnalysisConfig {
                top_n: 10,
                idf_threshold: 1.0,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();
        // Start with default values
        for (key, value) in Self::default() {
            builder = builder.set_default(key, value)?;
        }
        let config = builder
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("doc-analytics").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("DOC_ANALYTICS").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("data_dir must not be empty"));
        }
        if matches!(&self.storage.backup_suffix, Some(suffix) if suffix.is_empty()) {
            return Err(anyhow::anyhow!("backup_suffix must not be empty when set"));
        }

        if self.analysis.top_n == 0 {
            return Err(anyhow::anyhow!("top_n must be greater than 0"));
        }
        if !self.analysis.idf_threshold.is_finite() || self.analysis.idf_threshold < 0.0 {
            return Err(anyhow::anyhow!(
                "idf_threshold must be a finite, non-negative number"
            ));
        }

        Ok(())
    }

    /// Data directory, overridable through `DOC_ANALYTICS_DATA_DIR`
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        std::env::var("DOC_ANALYTICS_DATA_DIR")
            .map_or_else(|_| PathBuf::from(&self.storage.data_dir), PathBuf::from)
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

impl IntoIterator for AppConfig {
    type Item = (String, config::Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, config::Value>;

    fn into_iter(self) -> Self::IntoIter {
        let mut map = std::collections::HashMap::new();

        // Flatten the configuration into key-value pairs
        map.insert("logging.level".to_string(), config::Value::from(self.logging.level));
        if let Some(file_path) = self.logging.file_path {
            map.insert("logging.file_path".to_string(), config::Value::from(file_path));
        }
        map.insert("logging.format".to_string(), config::Value::from(self.logging.format));

        map.insert("storage.data_dir".to_string(), config::Value::from(self.storage.data_dir));
        map.insert(
            "storage.backup_existing".to_string(),
            config::Value::from(self.storage.backup_existing),
        );
        if let Some(suffix) = self.storage.backup_suffix {
            map.insert("storage.backup_suffix".to_string(), config::Value::from(suffix));
        }

        map.insert(
            "analysis.top_n".to_string(),
            config::Value::from(self.analysis.top_n as u64),
        );
        map.insert(
            "analysis.idf_threshold".to_string(),
            config::Value::from(self.analysis.idf_threshold),
        );

        map.into_iter()
    }
}

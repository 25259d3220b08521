use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use std::path::Path;

/// Validation utilities for command-line and query input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a data directory path
    pub fn validate_directory(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(anyhow!("Directory path cannot be empty"));
        }

        if path_str.len() > 4096 {
            return Err(anyhow!("Directory path too long (max 4096 characters)"));
        }

        if path.exists() && !path.is_dir() {
            return Err(anyhow!("Path exists but is not a directory: {path:?}"));
        }

        Ok(())
    }

    /// Validate a backup-suffix token used to select backup files
    pub fn validate_backup_token(token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(anyhow!("Backup token cannot be empty"));
        }

        if token.len() > 64 {
            return Err(anyhow!("Backup token too long (max 64 characters)"));
        }

        // Tokens are matched against file names
        if token.contains(['/', '\\', '\0']) {
            return Err(anyhow!("Backup token contains invalid characters"));
        }

        Ok(())
    }

    /// Validate an inclusive date interval for time series
    pub fn validate_date_range(start: NaiveDate, stop: NaiveDate) -> Result<()> {
        if start > stop {
            return Err(anyhow!("Start date cannot be after end date"));
        }

        // Warn about very large ranges that produce many windows
        let days = (stop - start).num_days();
        if days > 365 * 20 {
            tracing::warn!(
                "Large date range ({} days / {:.1} years) produces many windows",
                days,
                days as f64 / 365.0
            );
        }

        Ok(())
    }

    /// Validate a time-series window length
    pub fn validate_window(window: Duration) -> Result<()> {
        if window <= Duration::zero() {
            return Err(anyhow!("Window must be positive"));
        }

        Ok(())
    }

    /// Validate the `n` of a ranking query
    pub fn validate_top_n(n: usize) -> Result<()> {
        if n == 0 {
            return Err(anyhow!("Number of results must be greater than 0"));
        }

        if n > 100_000 {
            return Err(anyhow!("Number of results too large (max 100,000)"));
        }

        Ok(())
    }

    /// Sanitize a free-text filter such as a type prefix
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

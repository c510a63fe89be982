//! Export of aggregated results.
//!
//! Row formats (`csv`, `json`, `json-pretty`) write one file per author and
//! field; the workbook format writes one file per author with a sheet per
//! field.
//!
//! ## Output Layout
//!
//! ```text
//! {folder}/
//! ├── {prefix}{key}_profile.csv   # one per (author, field)
//! ├── {prefix}{key}_scopus.csv
//! ├── {prefix}{key}.xlsx          # xlsx: one workbook per author
//! └── {prefix}failures.json       # only when some fetch failed
//! ```

pub mod local;
#[cfg(feature = "xlsx")]
mod workbook;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{AggregateResult, OutputConfig};

// Re-export for convenience
pub use local::LocalExporter;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutFormat {
    Csv,
    Json,
    JsonPretty,
    Xlsx,
}

impl OutFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutFormat::Csv => "csv",
            OutFormat::Json => "json",
            OutFormat::JsonPretty => "json-pretty",
            OutFormat::Xlsx => "xlsx",
        }
    }

    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutFormat::Csv => "csv",
            OutFormat::Json | OutFormat::JsonPretty => "json",
            OutFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for OutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutFormat::Csv),
            "json" => Ok(OutFormat::Json),
            "json-pretty" | "json_pretty" => Ok(OutFormat::JsonPretty),
            "xlsx" => Ok(OutFormat::Xlsx),
            other => Err(AppError::invalid_input(format!(
                "unknown output format '{other}' (expected csv, json, json-pretty or xlsx)"
            ))),
        }
    }
}

/// Where and how to write an export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: OutFormat,
    /// Target directory, created when missing
    pub folder: PathBuf,
    /// Prepended to every file name
    pub prefix: String,
    /// Name files after the author's display name instead of the identifier
    pub use_fullname_prefix: bool,
}

impl ExportOptions {
    pub fn from_config(output: &OutputConfig) -> Result<Self> {
        Ok(Self {
            format: output.format.parse()?,
            folder: PathBuf::from(&output.folder),
            prefix: output.prefix.clone(),
            use_fullname_prefix: output.use_fullname_prefix,
        })
    }
}

/// Files written by one export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    /// Path of the failure report, when one was written
    pub failures_file: Option<PathBuf>,
    pub written_at: DateTime<Utc>,
}

/// Trait for export backends.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Write every bundle of `result`, plus the failure report if any.
    async fn export(&self, result: &AggregateResult, options: &ExportOptions)
    -> Result<ExportSummary>;
}

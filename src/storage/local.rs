//! Local filesystem exporter.
//!
//! ## Features
//!
//! - **Atomic writes**: every file is written to a temp path, then renamed
//! - **Stable names**: `{prefix}{key}_{field}.{ext}`, or `{prefix}{key}.xlsx`
//! - **Failure report**: `{prefix}failures.json` lists cells that could not
//!   be fetched

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{AggregateResult, AuthorBundle, Record};
use crate::storage::{ExportOptions, ExportSummary, Exporter, OutFormat};
use crate::utils::sanitize_file_stem;

/// Writes exports into a local directory.
#[derive(Debug, Clone, Default)]
pub struct LocalExporter;

impl LocalExporter {
    pub fn new() -> Self {
        Self
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn write_bundle(
        &self,
        bundle: &AuthorBundle,
        key: &str,
        options: &ExportOptions,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if options.format == OutFormat::Xlsx {
            let path = options
                .folder
                .join(format!("{}{}.xlsx", options.prefix, key));
            self.write_bytes(&path, &render_xlsx(bundle)?).await?;
            written.push(path);
            return Ok(written);
        }

        for (field, record) in &bundle.records {
            let bytes = match options.format {
                OutFormat::Csv => render_csv(record)?,
                OutFormat::Json => serde_json::to_vec(record)?,
                _ => serde_json::to_vec_pretty(record)?,
            };
            let path = options.folder.join(format!(
                "{}{}_{}.{}",
                options.prefix,
                key,
                field,
                options.format.extension()
            ));
            self.write_bytes(&path, &bytes).await?;
            log::debug!("Wrote {} entries to {}", record.len(), path.display());
            written.push(path);
        }

        Ok(written)
    }
}

#[async_trait]
impl Exporter for LocalExporter {
    async fn export(
        &self,
        result: &AggregateResult,
        options: &ExportOptions,
    ) -> Result<ExportSummary> {
        tokio::fs::create_dir_all(&options.folder).await?;

        let mut files = Vec::new();
        let mut used_keys = HashSet::new();
        for bundle in &result.authors {
            let mut key = file_key(bundle, options.use_fullname_prefix);
            if !used_keys.insert(key.clone()) {
                // Two authors share a display name
                key = format!("{}_{}", key, bundle.author);
                used_keys.insert(key.clone());
            }
            files.extend(self.write_bundle(bundle, &key, options).await?);
        }

        let failures_file = if result.failures.is_empty() {
            None
        } else {
            let path = options
                .folder
                .join(format!("{}failures.json", options.prefix));
            let bytes = serde_json::to_vec_pretty(&result.failures)?;
            self.write_bytes(&path, &bytes).await?;
            log::warn!(
                "{} failed fetch(es) listed in {}",
                result.failures.len(),
                path.display()
            );
            Some(path)
        };

        log::info!(
            "Exported {} file(s) as {} to {}",
            files.len(),
            options.format,
            options.folder.display()
        );

        Ok(ExportSummary {
            files,
            failures_file,
            written_at: Utc::now(),
        })
    }
}

/// File key for one author: the sanitized display name when requested and
/// known, else the identifier.
pub(crate) fn file_key(bundle: &AuthorBundle, use_fullname: bool) -> String {
    if use_fullname {
        if let Some(name) = bundle.display_name() {
            let stem = sanitize_file_stem(&name);
            if !stem.is_empty() {
                return stem;
            }
        }
    }
    bundle.author.to_string()
}

/// CSV with a header of every column seen, in first-seen order.
pub(crate) fn render_csv(record: &Record) -> Result<Vec<u8>> {
    let columns = record.columns();
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }
    for entry in record.entries() {
        writer.write_record(columns.iter().map(|c| entry.text(c).unwrap_or_default()))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

#[cfg(feature = "xlsx")]
fn render_xlsx(bundle: &AuthorBundle) -> Result<Vec<u8>> {
    crate::storage::workbook::render_workbook(bundle)
}

#[cfg(not(feature = "xlsx"))]
fn render_xlsx(_bundle: &AuthorBundle) -> Result<Vec<u8>> {
    Err(AppError::config(
        "xlsx output is not available in this build (enable the `xlsx` feature)",
    ))
}

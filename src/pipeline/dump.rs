// src/pipeline/dump.rs

//! Dump pipeline: normalize, fetch, export.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{
    AggregateResult, ColumnSelection, Config, Credential, FieldSelection, RawAuthorId,
};
use crate::services::{Aggregator, SessionManager, SessionProvider};
use crate::sources::SourceRegistry;
use crate::storage::{ExportOptions, ExportSummary, Exporter};

/// Everything a caller chooses for one dump.
#[derive(Debug, Clone)]
pub struct DumpRequest {
    pub ids: Vec<RawAuthorId>,
    pub fields: FieldSelection,
    pub columns: ColumnSelection,
    pub export: ExportOptions,
}

/// Outcome of a dump run.
#[derive(Debug)]
pub struct DumpReport {
    pub result: AggregateResult,
    pub export: ExportSummary,
    pub logins: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Run a dump against the live portal.
///
/// A session is only established when a restricted field is selected, in
/// which case `credential` is required.
pub async fn run_dump(
    config: &Config,
    request: &DumpRequest,
    credential: Option<Credential>,
    exporter: &dyn Exporter,
) -> Result<DumpReport> {
    let restricted: Vec<_> = request
        .fields
        .fields()
        .into_iter()
        .filter(|f| f.is_restricted())
        .collect();

    let manager = if restricted.is_empty() {
        None
    } else {
        let credential = credential.ok_or_else(|| {
            AppError::invalid_input(format!(
                "username and password are required for {}",
                restricted
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
        Some(SessionManager::new(config.portal.clone(), credential))
    };

    let aggregator = Aggregator::new(SourceRegistry::standard(config)?, &config.fetch)
        .with_columns(request.columns.clone());
    let sessions = manager.as_ref().map(|m| m as &dyn SessionProvider);

    let mut report = run_dump_with(&aggregator, sessions, request, exporter).await?;
    report.logins = manager.as_ref().map_or(0, SessionManager::login_count);
    Ok(report)
}

/// Run a dump with an explicit aggregator and session provider.
pub async fn run_dump_with(
    aggregator: &Aggregator,
    sessions: Option<&dyn SessionProvider>,
    request: &DumpRequest,
    exporter: &dyn Exporter,
) -> Result<DumpReport> {
    let start_time = Utc::now();
    log::info!(
        "Dumping {} for {} identifier(s)",
        request.fields,
        request.ids.len()
    );

    let result = aggregator
        .dump(&request.ids, &request.fields, sessions)
        .await?;
    let export = exporter.export(&result, &request.export).await?;

    let end_time = Utc::now();
    let cells: usize = result.authors.iter().map(|b| b.records.len()).sum();
    let entries: usize = result
        .authors
        .iter()
        .flat_map(|b| b.records.values())
        .map(|r| r.len())
        .sum();

    log::info!(
        "Fetched {} author(s), {} cell(s), {} entries in {} ms",
        result.authors.len(),
        cells,
        entries,
        (end_time - start_time).num_milliseconds()
    );
    if result.is_complete() {
        log::info!("All cells fetched successfully");
    } else {
        log::warn!(
            "{} of {} cell(s) failed and were exported empty",
            result.failures.len(),
            cells
        );
    }

    Ok(DumpReport {
        result,
        export,
        logins: 0,
        start_time,
        end_time,
    })
}

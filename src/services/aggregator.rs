// src/services/aggregator.rs

//! Batch retrieval over authors and fields.
//!
//! Every (author, field) pair is one independent fetch. Fetches run
//! concurrently up to `max_concurrent`; a failed fetch becomes an empty
//! record plus a [`FetchFailure`], so one broken source never blocks the
//! others. Only authentication failures abort the batch.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{
    AggregateResult, AuthorBundle, AuthorId, ColumnSelection, FetchConfig, FetchFailure,
    FieldSelection, RawAuthorId, Record,
};
use crate::services::normalizer::{non_numeric, normalize};
use crate::services::session::SessionProvider;
use crate::sources::{SourceAdapter, SourceRegistry};

/// Drives the source adapters for a batch of authors.
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: SourceRegistry,
    max_concurrent: usize,
    delay: Duration,
    columns: ColumnSelection,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, fetch: &FetchConfig) -> Self {
        Self {
            registry,
            max_concurrent: fetch.max_concurrent.max(1),
            delay: Duration::from_millis(fetch.request_delay_ms),
            columns: ColumnSelection::All,
        }
    }

    /// Keep only these columns in every fetched entry.
    pub fn with_columns(mut self, columns: ColumnSelection) -> Self {
        self.columns = columns;
        self
    }

    /// Fetch the selected fields for every author.
    ///
    /// Identifiers are normalized first; duplicates are fetched once. The
    /// result holds one bundle per author in request order, each with
    /// exactly the selected fields in canonical order. `sessions` may be
    /// `None` only when no restricted field is selected.
    pub async fn dump(
        &self,
        identifiers: &[RawAuthorId],
        selection: &FieldSelection,
        sessions: Option<&dyn SessionProvider>,
    ) -> Result<AggregateResult> {
        let authors = normalize(Some(identifiers))?;
        if authors.is_empty() {
            return Err(AppError::invalid_input("no author identifiers given"));
        }
        let invalid = non_numeric(&authors);
        if !invalid.is_empty() {
            let names: Vec<&str> = invalid.iter().map(|a| a.as_str()).collect();
            return Err(AppError::invalid_input(format!(
                "author identifiers must be numeric: {}",
                names.join(", ")
            )));
        }

        let fields = selection.fields();
        let adapters = fields
            .iter()
            .map(|&field| {
                self.registry
                    .get(field)
                    .ok_or_else(|| AppError::config(format!("no adapter registered for {field}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let restricted: Vec<&str> = adapters
            .iter()
            .filter(|a| a.requires_session())
            .map(|a| a.field().as_str())
            .collect();
        if !restricted.is_empty() && sessions.is_none() {
            return Err(AppError::invalid_input(format!(
                "fields {} need portal credentials",
                restricted.join(", ")
            )));
        }

        log::info!(
            "Fetching {} field(s) for {} author(s), {} at a time",
            fields.len(),
            authors.len(),
            self.max_concurrent
        );

        let jobs: Vec<(usize, &AuthorId, usize, &Arc<dyn SourceAdapter>)> = authors
            .iter()
            .enumerate()
            .flat_map(|(ai, author)| {
                adapters
                    .iter()
                    .enumerate()
                    .map(move |(fi, adapter)| (ai, author, fi, adapter))
            })
            .collect();

        // slots[author][field], filled in completion order, read in request order
        let mut slots: Vec<Vec<Option<Result<Record>>>> = authors
            .iter()
            .map(|_| fields.iter().map(|_| None).collect())
            .collect();

        let mut cells = stream::iter(jobs)
            .map(|(ai, author, fi, adapter)| async move {
                let result = self.fetch_cell(author, adapter.as_ref(), sessions).await;
                (ai, fi, result)
            })
            .buffer_unordered(self.max_concurrent);

        while let Some((ai, fi, result)) = cells.next().await {
            let result = match result {
                Err(error) if error.is_fatal() => {
                    log::error!("Aborting batch: {error}");
                    return Err(error.into_root());
                }
                other => other,
            };
            slots[ai][fi] = Some(result);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        let mut outcome = AggregateResult::default();
        for (author, row) in authors.iter().zip(slots) {
            let mut bundle = AuthorBundle::new(author.clone());
            for (&field, slot) in fields.iter().zip(row) {
                let record = match slot {
                    Some(Ok(record)) => record,
                    Some(Err(error)) => {
                        log::warn!("{field} for author {author} failed: {error}");
                        outcome.failures.push(FetchFailure::new(author.clone(), field, &error));
                        Record::empty()
                    }
                    None => Record::empty(),
                };
                bundle.insert(field, record);
            }
            outcome.authors.push(bundle);
        }

        Ok(outcome)
    }

    /// [`Aggregator::dump`] for a single author.
    pub async fn fetch_one(
        &self,
        identifier: impl Into<RawAuthorId>,
        selection: &FieldSelection,
        sessions: Option<&dyn SessionProvider>,
    ) -> Result<AggregateResult> {
        self.dump(&[identifier.into()], selection, sessions).await
    }

    /// Fetch one cell, renewing the session and retrying once when the
    /// portal reports it expired.
    async fn fetch_cell(
        &self,
        author: &AuthorId,
        adapter: &dyn SourceAdapter,
        sessions: Option<&dyn SessionProvider>,
    ) -> Result<Record> {
        let field = adapter.field();
        log::debug!("Fetching {field} for author {author}");

        let result = match sessions.filter(|_| adapter.requires_session()) {
            None => adapter.fetch(author, None).await,
            Some(provider) => Self::fetch_with_session(author, adapter, provider).await,
        };

        result
            .map(|mut record| {
                record.project(&self.columns);
                log::debug!("{field} for author {author}: {} entries", record.len());
                record
            })
            .map_err(|e| AppError::source_fetch(field, e))
    }

    async fn fetch_with_session(
        author: &AuthorId,
        adapter: &dyn SourceAdapter,
        provider: &dyn SessionProvider,
    ) -> Result<Record> {
        let session = provider.ensure_session().await?;
        match adapter.fetch(author, Some(&session)).await {
            Err(e) if e.is_session_expired() => {
                let fresh = provider.renew(&session).await?;
                adapter.fetch(author, Some(&fresh)).await
            }
            other => other,
        }
    }
}

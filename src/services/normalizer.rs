// src/services/normalizer.rs

//! Author identifier normalization.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{AuthorId, RawAuthorId};

/// Canonicalize, trim and deduplicate caller-supplied author identifiers.
///
/// Numbers and strings with the same digits collapse to one identifier;
/// blank inputs are dropped and first-seen order is kept. Only a missing
/// list is an error.
pub fn normalize(identifiers: Option<&[RawAuthorId]>) -> Result<Vec<AuthorId>> {
    let identifiers = identifiers
        .ok_or_else(|| AppError::invalid_input("author identifiers are missing"))?;

    let mut seen = HashSet::new();
    let normalized = identifiers
        .iter()
        .filter_map(|raw| AuthorId::new(raw.to_canonical()))
        .filter(|id| seen.insert(id.clone()))
        .collect();

    Ok(normalized)
}

/// Identifiers the portal cannot address because they are not numeric.
pub fn non_numeric(authors: &[AuthorId]) -> Vec<&AuthorId> {
    authors.iter().filter(|a| !a.is_numeric()).collect()
}

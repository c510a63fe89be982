// src/models/mod.rs

//! Domain models for sintautils.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod author;
pub mod config;
mod field;
mod record;

// Re-export all public types
pub use author::{AuthorId, Credential, RawAuthorId};
pub use config::{Config, FetchConfig, LoggingConfig, OutputConfig, PortalConfig};
pub use field::{FieldSelection, SourceField};
pub use record::{
    AggregateResult, AuthorBundle, ColumnSelection, Entry, FailureKind, FetchFailure, Record,
    value_to_text,
};

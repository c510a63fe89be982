// src/error.rs

//! Unified error handling for sintautils.

use std::fmt;

use thiserror::Error;

use crate::models::SourceField;

/// Result type alias for sintautils operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The portal rejected the credential or could not be reached for login
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A network call exceeded the configured timeout
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// The portal answered with its login page instead of the requested page
    #[error("Portal session expired")]
    SessionExpired,

    /// One (author, field) fetch failed
    #[error("Failed to fetch {field}: {source}")]
    SourceFetch {
        field: SourceField,
        #[source]
        source: Box<AppError>,
    },

    /// The portal does not know the author
    #[error("Author not found: {0}")]
    AuthorNotFound(String),

    /// A page did not have the expected shape
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Malformed caller input, rejected before any request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook writing failed
    #[cfg(feature = "xlsx")]
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: error.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            Self::Http(error)
        }
    }
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an error as the failure of one source fetch.
    ///
    /// Already wrapped errors are returned unchanged.
    pub fn source_fetch(field: SourceField, error: AppError) -> Self {
        match error {
            wrapped @ Self::SourceFetch { .. } => wrapped,
            other => Self::SourceFetch {
                field,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through `SourceFetch` wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            Self::SourceFetch { source, .. } => source.root(),
            other => other,
        }
    }

    /// Owned counterpart of [`AppError::root`].
    pub fn into_root(self) -> AppError {
        match self {
            Self::SourceFetch { source, .. } => source.into_root(),
            other => other,
        }
    }

    /// True when the portal session has to be renewed.
    pub fn is_session_expired(&self) -> bool {
        matches!(self.root(), Self::SessionExpired)
    }

    /// True when the error must abort the whole batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self.root(), Self::Authentication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_fetch_does_not_double_wrap() {
        let inner = AppError::parse("scopus page 1", "missing table");
        let once = AppError::source_fetch(SourceField::Scopus, inner);
        let twice = AppError::source_fetch(SourceField::Wos, once);

        match &twice {
            AppError::SourceFetch { field, .. } => assert_eq!(*field, SourceField::Scopus),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(twice.root(), AppError::Parse { .. }));
    }

    #[test]
    fn test_session_expired_seen_through_wrapper() {
        let err = AppError::source_fetch(SourceField::Book, AppError::SessionExpired);
        assert!(err.is_session_expired());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_authentication_is_fatal() {
        assert!(AppError::authentication("bad password").is_fatal());
        assert!(!AppError::invalid_input("empty").is_fatal());
    }

    #[test]
    fn test_display_names_field() {
        let err = AppError::source_fetch(
            SourceField::Garuda,
            AppError::AuthorNotFound("42".to_string()),
        );
        assert_eq!(err.to_string(), "Failed to fetch garuda: Author not found: 42");
    }
}

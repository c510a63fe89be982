// src/models/author.rs

//! Author identifiers and portal credentials.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// An author identifier as supplied by a caller: text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAuthorId {
    Number(i64),
    Text(String),
}

impl RawAuthorId {
    /// Canonical string form, before trimming.
    pub fn to_canonical(&self) -> String {
        match self {
            RawAuthorId::Number(n) => n.to_string(),
            RawAuthorId::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawAuthorId {
    fn from(s: &str) -> Self {
        RawAuthorId::Text(s.to_string())
    }
}

impl From<String> for RawAuthorId {
    fn from(s: String) -> Self {
        RawAuthorId::Text(s)
    }
}

impl From<i64> for RawAuthorId {
    fn from(n: i64) -> Self {
        RawAuthorId::Number(n)
    }
}

impl From<i32> for RawAuthorId {
    fn from(n: i32) -> Self {
        RawAuthorId::Number(n.into())
    }
}

impl From<u32> for RawAuthorId {
    fn from(n: u32) -> Self {
        RawAuthorId::Number(n.into())
    }
}

/// A normalized author identifier: trimmed, non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    /// Build an identifier from raw text, trimming whitespace.
    ///
    /// Returns `None` when nothing is left after trimming.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Portal identifiers are decimal integers.
    pub fn is_numeric(&self) -> bool {
        self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AuthorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Portal login credential. The secret never appears in `Debug` output.
pub struct Credential {
    username: String,
    password: SecretString,
}

impl Credential {
    /// Create a credential; both parts must be non-blank.
    ///
    /// The username is stored trimmed; the password is kept as given.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username: String = username.into();
        let username = username.trim().to_string();
        let password: String = password.into();
        if username.is_empty() || password.trim().is_empty() {
            return Err(AppError::invalid_input(
                "username and password are required for the portal",
            ));
        }
        Ok(Self {
            username,
            password: SecretString::from(password),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

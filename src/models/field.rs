// src/models/field.rs

//! The fixed set of retrievable data categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One retrievable category of author data.
///
/// Declaration order is the canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceField {
    Profile,
    Book,
    Ipr,
    Research,
    Service,
    Scopus,
    Wos,
    Gscholar,
    Garuda,
}

impl SourceField {
    /// Every recognized field, in canonical order.
    pub const ALL: [SourceField; 9] = [
        SourceField::Profile,
        SourceField::Book,
        SourceField::Ipr,
        SourceField::Research,
        SourceField::Service,
        SourceField::Scopus,
        SourceField::Wos,
        SourceField::Gscholar,
        SourceField::Garuda,
    ];

    /// Wire name used in selectors, file names and sheet names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceField::Profile => "profile",
            SourceField::Book => "book",
            SourceField::Ipr => "ipr",
            SourceField::Research => "research",
            SourceField::Service => "service",
            SourceField::Scopus => "scopus",
            SourceField::Wos => "wos",
            SourceField::Gscholar => "gscholar",
            SourceField::Garuda => "garuda",
        }
    }

    /// Whether fetching this field needs an authenticated portal session.
    pub fn is_restricted(&self) -> bool {
        !matches!(self, SourceField::Profile | SourceField::Garuda)
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let field = match s.trim().to_lowercase().as_str() {
            "profile" => SourceField::Profile,
            "book" | "books" => SourceField::Book,
            "ipr" | "iprs" => SourceField::Ipr,
            "research" | "researches" => SourceField::Research,
            "service" | "services" => SourceField::Service,
            "scopus" => SourceField::Scopus,
            "wos" => SourceField::Wos,
            "gscholar" | "google" | "googlescholar" => SourceField::Gscholar,
            "garuda" => SourceField::Garuda,
            other => {
                return Err(AppError::invalid_input(format!(
                    "unknown field '{other}'"
                )));
            }
        };
        Ok(field)
    }
}

/// A caller's choice of fields: the wildcard or an explicit subset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldSelection {
    #[default]
    All,
    Only(Vec<SourceField>),
}

impl FieldSelection {
    /// Parse a selector such as `"*"`, `"book garuda"` or `"scopus,wos"`.
    pub fn parse(selector: &str) -> Result<Self> {
        Self::from_names(selector.split(|c: char| c.is_whitespace() || c == ','))
    }

    /// Build a selection from separate names; any `*` selects everything,
    /// but every other name must still be a known field.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = Vec::new();
        let mut wildcard = false;
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name == "*" {
                wildcard = true;
                continue;
            }
            let field: SourceField = name.parse()?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        if wildcard {
            return Ok(FieldSelection::All);
        }
        if fields.is_empty() {
            return Err(AppError::invalid_input("no fields selected"));
        }
        Ok(FieldSelection::Only(fields))
    }

    /// The selected fields, deduplicated and in canonical order.
    pub fn fields(&self) -> Vec<SourceField> {
        match self {
            FieldSelection::All => SourceField::ALL.to_vec(),
            FieldSelection::Only(fields) => {
                let mut fields = fields.clone();
                fields.sort();
                fields.dedup();
                fields
            }
        }
    }
}

impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelection::All => f.write_str("all fields"),
            FieldSelection::Only(_) => {
                let names: Vec<&str> = self.fields().iter().map(SourceField::as_str).collect();
                f.write_str(&names.join(" "))
            }
        }
    }
}

impl FromStr for FieldSelection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

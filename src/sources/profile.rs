// src/sources/profile.rs

//! Institutional profile card from the public author page.

use std::collections::HashMap;

use async_trait::async_trait;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{AuthorId, Entry, PortalConfig, Record, SourceField};
use crate::services::Session;
use crate::sources::table::parse_selector;
use crate::sources::{Fetcher, SourceAdapter};
use crate::utils::normalize_whitespace;

/// Score labels on the card and the columns they fill.
const SCORES: [(&str, &str); 4] = [
    ("sinta score overall", "sinta_score_overall"),
    ("sinta score 3yr", "sinta_score_3yr"),
    ("affil score", "affil_score"),
    ("affil score 3yr", "affil_score_3yr"),
];

/// Reads the header card of an author's public page into a single entry.
pub struct ProfileAdapter {
    portal: PortalConfig,
    client: reqwest::Client,
}

impl ProfileAdapter {
    pub fn new(portal: PortalConfig, client: reqwest::Client) -> Self {
        Self { portal, client }
    }
}

#[async_trait]
impl SourceAdapter for ProfileAdapter {
    fn field(&self) -> SourceField {
        SourceField::Profile
    }

    async fn fetch(&self, author: &AuthorId, session: Option<&Session>) -> Result<Record> {
        let wrap = |e| AppError::source_fetch(SourceField::Profile, e);
        let fetcher =
            Fetcher::for_field(SourceField::Profile, session, &self.client, &self.portal)
                .map_err(wrap)?;
        let url = self.portal.public_author_url(author.as_str(), None);

        let page = fetcher.get(&url).await.map_err(wrap)?;
        let entry = parse_profile(&page.body, author, &page.url).map_err(wrap)?;
        Ok(Record::new(vec![entry]))
    }
}

/// Parse the profile card. A page without an author name is not a profile.
pub(crate) fn parse_profile(body: &str, author: &AuthorId, page_url: &str) -> Result<Entry> {
    let document = Html::parse_document(body);
    let texts = |selector: &str| -> Result<Vec<String>> {
        let sel = parse_selector(selector)?;
        Ok(document
            .select(&sel)
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .collect())
    };

    let name = texts("div.profile-name h3")?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::parse(page_url, "profile card has no author name"))?;

    let meta = texts("div.meta-profile a")?;
    let sinta_id = meta
        .iter()
        .find_map(|t| t.strip_prefix("SINTA ID :").map(|id| id.trim().to_string()))
        .unwrap_or_else(|| author.to_string());
    let mut details = meta.iter().filter(|t| !t.starts_with("SINTA ID"));
    let affiliation = details.next().cloned().unwrap_or_default();
    let study_program = details.next().cloned().unwrap_or_default();

    let labels = texts("div.pr-txt")?;
    let numbers = texts("div.pr-num")?;
    let scores: HashMap<String, String> = labels
        .into_iter()
        .map(|l| l.to_lowercase())
        .zip(numbers)
        .collect();

    let mut entry = Entry::new()
        .with_text("name", name)
        .with_text("sinta_id", sinta_id)
        .with_text("affiliation", affiliation)
        .with_text("study_program", study_program);
    for (label, column) in SCORES {
        let raw = scores.get(label).map(String::as_str).unwrap_or("");
        entry = entry.with_number(column, raw);
    }

    let subjects = texts("ul.subject-list li")?;
    Ok(entry.with_text("subjects", subjects.join("; ")))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    const PAGE_URL: &str = "https://sinta.kemdikbud.go.id/authors/profile/6005015";

    const PROFILE: &str = r##"
    <html><body>
    <div class="profile-name"><h3><a href="#">Budi   Santoso</a></h3></div>
    <div class="meta-profile">
      <a href="/affiliations/profile/404">Universitas Contoh</a>
      <a href="/departments/profile/404/1">S1 - Teknik Informatika</a>
      <a href="#">SINTA ID : 6005015</a>
    </div>
    <div class="row">
      <div class="col"><div class="pr-num">1.532</div><div class="pr-txt">SINTA Score Overall</div></div>
      <div class="col"><div class="pr-num">412</div><div class="pr-txt">SINTA Score 3Yr</div></div>
      <div class="col"><div class="pr-num">20.110</div><div class="pr-txt">Affil Score</div></div>
      <div class="col"><div class="pr-num">6.002</div><div class="pr-txt">Affil Score 3Yr</div></div>
    </div>
    <ul class="subject-list"><li><a>Machine Learning</a></li><li><a>Data Mining</a></li></ul>
    </body></html>"##;

    #[test]
    fn test_parse_profile_card() {
        let author = AuthorId::new("6005015").unwrap();
        let entry = parse_profile(PROFILE, &author, PAGE_URL).unwrap();

        assert_eq!(entry.text("name").unwrap(), "Budi Santoso");
        assert_eq!(entry.text("sinta_id").unwrap(), "6005015");
        assert_eq!(entry.text("affiliation").unwrap(), "Universitas Contoh");
        assert_eq!(entry.text("study_program").unwrap(), "S1 - Teknik Informatika");
        assert_eq!(entry.get("sinta_score_overall"), Some(&Value::from(1532)));
        assert_eq!(entry.get("sinta_score_3yr"), Some(&Value::from(412)));
        assert_eq!(entry.get("affil_score"), Some(&Value::from(20110)));
        assert_eq!(entry.get("affil_score_3yr"), Some(&Value::from(6002)));
        assert_eq!(entry.text("subjects").unwrap(), "Machine Learning; Data Mining");
    }

    #[test]
    fn test_sparse_card_keeps_every_column() {
        let author = AuthorId::new("77").unwrap();
        let body = r#"<div class="profile-name"><h3>Sari Dewi</h3></div>"#;
        let entry = parse_profile(body, &author, PAGE_URL).unwrap();
        assert_eq!(entry.text("sinta_id").unwrap(), "77");
        assert_eq!(entry.text("affiliation").unwrap(), "");
        assert_eq!(entry.text("affil_score").unwrap(), "");
        assert_eq!(entry.len(), 9);
    }

    #[test]
    fn test_page_without_name_is_parse_error() {
        let author = AuthorId::new("1").unwrap();
        let result = parse_profile("<html><body></body></html>", &author, PAGE_URL);
        assert!(matches!(result, Err(AppError::Parse { .. })));
    }

    #[test]
    fn test_profile_is_public() {
        let adapter = ProfileAdapter::new(PortalConfig::default(), reqwest::Client::new());
        assert_eq!(adapter.field(), SourceField::Profile);
        assert!(!adapter.requires_session());
    }
}

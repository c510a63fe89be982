// src/sources/mod.rs

//! Source adapters: one per portal section.
//!
//! Every adapter turns one author's page(s) for its section into a
//! [`Record`]. Restricted adapters read through an authenticated
//! [`Session`]; public adapters use a plain client.

mod citations;
mod garuda;
mod listing;
mod portfolio;
mod profile;
pub(crate) mod table;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{AppError, Result};
use crate::models::{AuthorId, Config, PortalConfig, Record, SourceField};
use crate::services::Session;
use crate::utils::http::{self, Page};

pub use listing::ListingAdapter;
pub use profile::ProfileAdapter;

/// Fetches and parses one section of an author's profile.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The section this adapter produces.
    fn field(&self) -> SourceField;

    /// Whether `fetch` needs an authenticated session.
    fn requires_session(&self) -> bool {
        self.field().is_restricted()
    }

    /// Fetch every page of the section for `author`.
    ///
    /// An author with nothing in the section yields an empty record.
    /// Failures are reported as [`AppError::SourceFetch`] carrying the field.
    async fn fetch(&self, author: &AuthorId, session: Option<&Session>) -> Result<Record>;
}

/// How an adapter reaches the portal for one fetch.
pub(crate) enum Fetcher<'a> {
    Session(&'a Session),
    Public {
        client: &'a reqwest::Client,
        not_found_marker: &'a str,
    },
}

impl<'a> Fetcher<'a> {
    /// Pick the session for restricted sections and the plain client otherwise.
    pub(crate) fn for_field(
        field: SourceField,
        session: Option<&'a Session>,
        client: &'a reqwest::Client,
        portal: &'a PortalConfig,
    ) -> Result<Self> {
        if !field.is_restricted() {
            return Ok(Self::Public {
                client,
                not_found_marker: &portal.not_found_marker,
            });
        }
        session
            .map(Self::Session)
            .ok_or_else(|| AppError::config(format!("{field} requires a portal session")))
    }

    pub(crate) async fn get(&self, url: &str) -> Result<Page> {
        match self {
            Self::Session(session) => session.get_page(url).await,
            Self::Public {
                client,
                not_found_marker,
            } => {
                let page = http::fetch_page_async(client, url).await?;
                if page.status == StatusCode::NOT_FOUND || page.url.contains(not_found_marker) {
                    return Err(AppError::AuthorNotFound(url.to_string()));
                }
                page.ensure_success()?;
                Ok(page)
            }
        }
    }
}

/// The adapters available to an aggregator, keyed by field.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: BTreeMap<SourceField, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in adapter for every field.
    pub fn standard(config: &Config) -> Result<Self> {
        let client = http::create_async_client(&config.portal)?;
        let portal = &config.portal;
        let max_pages = config.fetch.max_pages;

        let registry = Self::new()
            .with(ProfileAdapter::new(portal.clone(), client.clone()))
            .with(ListingAdapter::book(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::ipr(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::research(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::service(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::scopus(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::wos(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::gscholar(portal.clone(), client.clone(), max_pages))
            .with(ListingAdapter::garuda(portal.clone(), client, max_pages));

        Ok(registry)
    }

    /// Register `adapter`, replacing any adapter for the same field.
    pub fn with(mut self, adapter: impl SourceAdapter + 'static) -> Self {
        self.register(Arc::new(adapter));
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.field(), adapter);
    }

    pub fn get(&self, field: SourceField) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.get(&field).cloned()
    }

    pub fn fields(&self) -> impl Iterator<Item = SourceField> + '_ {
        self.adapters.keys().copied()
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.adapters.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_every_field() {
        let registry = SourceRegistry::standard(&Config::default()).unwrap();
        let fields: Vec<_> = registry.fields().collect();
        assert_eq!(fields, SourceField::ALL.to_vec());

        for field in SourceField::ALL {
            let adapter = registry.get(field).unwrap();
            assert_eq!(adapter.field(), field);
            assert_eq!(adapter.requires_session(), field.is_restricted());
        }
    }

    #[test]
    fn test_restricted_fetcher_needs_session() {
        let portal = PortalConfig::default();
        let client = reqwest::Client::new();
        assert!(Fetcher::for_field(SourceField::Scopus, None, &client, &portal).is_err());
        assert!(Fetcher::for_field(SourceField::Garuda, None, &client, &portal).is_ok());

        let session = Session::detached(1);
        assert!(matches!(
            Fetcher::for_field(SourceField::Book, Some(&session), &client, &portal),
            Ok(Fetcher::Session(_))
        ));
    }

    #[tokio::test]
    async fn test_public_fetch_maps_missing_author() {
        let mut server = mockito::Server::new_async().await;
        let _gone = server
            .mock("GET", "/authors/profile/404")
            .with_status(404)
            .create_async()
            .await;
        let _redirected = server
            .mock("GET", "/authors/profile/302")
            .with_status(302)
            .with_header("location", "/authorverification/author/all")
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/authorverification/author/all")
            .with_status(200)
            .with_body("<table></table>")
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/authors/profile/500")
            .with_status(500)
            .create_async()
            .await;

        let portal = PortalConfig::default();
        let client = reqwest::Client::new();
        let fetcher = Fetcher::for_field(SourceField::Profile, None, &client, &portal).unwrap();
        let url = |id: u32| format!("{}/authors/profile/{id}", server.url());

        let err = fetcher.get(&url(404)).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorNotFound(_)), "{err}");

        let err = fetcher.get(&url(302)).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorNotFound(_)), "{err}");

        let err = fetcher.get(&url(500)).await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 500, .. }), "{err}");
    }
}

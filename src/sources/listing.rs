// src/sources/listing.rs

//! Adapter for sections rendered as a paginated listing.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{AuthorId, PortalConfig, Record, SourceField};
use crate::services::Session;
use crate::sources::table::{self, Layout};
use crate::sources::{Fetcher, SourceAdapter};

/// Reads one listing view of an author's profile.
///
/// Restricted fields are read from the verification portal, public ones
/// from the public author pages. Constructors for each source live next
/// to that source's layout.
pub struct ListingAdapter {
    field: SourceField,
    view: &'static str,
    layout: &'static Layout,
    portal: PortalConfig,
    client: reqwest::Client,
    max_pages: usize,
}

impl ListingAdapter {
    pub(crate) fn new(
        field: SourceField,
        view: &'static str,
        layout: &'static Layout,
        portal: PortalConfig,
        client: reqwest::Client,
        max_pages: usize,
    ) -> Self {
        Self {
            field,
            view,
            layout,
            portal,
            client,
            max_pages,
        }
    }

    /// URL of the listing's first page, without the page parameter.
    pub fn view_url(&self, author: &AuthorId) -> String {
        if self.field.is_restricted() {
            self.portal.author_view_url(author.as_str(), self.view)
        } else {
            self.portal.public_author_url(author.as_str(), Some(self.view))
        }
    }

    pub(crate) fn layout(&self) -> &'static Layout {
        self.layout
    }
}

#[async_trait]
impl SourceAdapter for ListingAdapter {
    fn field(&self) -> SourceField {
        self.field
    }

    async fn fetch(&self, author: &AuthorId, session: Option<&Session>) -> Result<Record> {
        let fetcher = Fetcher::for_field(self.field, session, &self.client, &self.portal)
            .map_err(|e| AppError::source_fetch(self.field, e))?;
        let url = self.view_url(author);
        log::debug!("Scraping {} for author {}", self.field, author);

        table::scrape_listing(&fetcher, &url, self.layout, self.max_pages)
            .await
            .map_err(|e| AppError::source_fetch(self.field, e))
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Mock, Server};

    use super::*;

    /// Serve page `n` of a `total`-page Google Scholar listing for author 7.
    async fn scholar_page(server: &mut Server, n: usize, total: usize, hits: usize) -> Mock {
        let body = format!(
            r#"<html><body>
            <div class="table-responsive"><table class="table">
              <tr><td class="text-lg-nowrap text-nowrap"><a href="/doc/{n}">p{n}</a>
                <small>Author : S Budi</small></td>
                <td><strong>2020</strong></td><td><strong>{n}</strong></td></tr>
            </table></div>
            <div class="col-md-12"><small>Page {n} of {total} | Total Records : {total}</small></div>
            </body></html>"#
        );
        server
            .mock(
                "GET",
                Matcher::Regex(r"^/authorverification/author/profile/7(\?.*)?$".to_string()),
            )
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("view".into(), "google".into()),
                Matcher::UrlEncoded("page".into(), n.to_string()),
            ]))
            .with_status(200)
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    fn portal_at(server: &Server) -> PortalConfig {
        PortalConfig {
            base_url: format!("{}/authorverification", server.url()),
            public_base_url: server.url(),
            ..PortalConfig::default()
        }
    }

    fn titles(record: &Record) -> Vec<String> {
        record
            .entries()
            .iter()
            .map(|e| e.text("title").unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_view_urls() {
        let portal = PortalConfig::default();
        let client = reqwest::Client::new();
        let author = AuthorId::new("6005015").unwrap();

        let scopus = ListingAdapter::scopus(portal.clone(), client.clone(), 5);
        assert_eq!(
            scopus.view_url(&author),
            "https://sinta.kemdikbud.go.id/authorverification/author/profile/6005015?view=scopus"
        );

        let garuda = ListingAdapter::garuda(portal, client, 5);
        assert_eq!(
            garuda.view_url(&author),
            "https://sinta.kemdikbud.go.id/authors/profile/6005015?view=garuda"
        );
    }

    #[tokio::test]
    async fn test_fetch_reads_every_page_in_order() {
        let mut server = Server::new_async().await;
        let mut pages = Vec::new();
        for n in 1..=3 {
            pages.push(scholar_page(&mut server, n, 3, 1).await);
        }

        let adapter = ListingAdapter::gscholar(portal_at(&server), reqwest::Client::new(), 10);
        let session = Session::detached(1);
        let author = AuthorId::new("7").unwrap();
        let record = adapter.fetch(&author, Some(&session)).await.unwrap();

        assert_eq!(titles(&record), ["p1", "p2", "p3"]);
        for page in pages {
            page.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_fetch_stops_at_max_pages() {
        let mut server = Server::new_async().await;
        let first = scholar_page(&mut server, 1, 3, 1).await;
        let second = scholar_page(&mut server, 2, 3, 1).await;
        let third = scholar_page(&mut server, 3, 3, 0).await;

        let adapter = ListingAdapter::gscholar(portal_at(&server), reqwest::Client::new(), 2);
        let session = Session::detached(1);
        let author = AuthorId::new("7").unwrap();
        let record = adapter.fetch(&author, Some(&session)).await.unwrap();

        assert_eq!(titles(&record), ["p1", "p2"]);
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn test_public_listing_unknown_author_is_field_failure() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", Matcher::Regex(r"^/authors/profile/9(\?.*)?$".to_string()))
            .with_status(404)
            .create_async()
            .await;

        let adapter = ListingAdapter::garuda(portal_at(&server), reqwest::Client::new(), 5);
        let author = AuthorId::new("9").unwrap();
        let err = adapter.fetch(&author, None).await.unwrap_err();

        assert!(matches!(
            &err,
            AppError::SourceFetch {
                field: SourceField::Garuda,
                ..
            }
        ));
        assert!(matches!(err.root(), AppError::AuthorNotFound(_)));
    }

    #[tokio::test]
    async fn test_restricted_fetch_without_session_carries_field() {
        let adapter = ListingAdapter::research(PortalConfig::default(), reqwest::Client::new(), 5);
        let author = AuthorId::new("1").unwrap();
        let err = adapter.fetch(&author, None).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::SourceFetch {
                field: SourceField::Research,
                ..
            }
        ));
    }
}

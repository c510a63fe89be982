// src/sources/garuda.rs

//! Garuda (national repository) publications from the public author page.

use crate::models::{PortalConfig, SourceField};
use crate::sources::ListingAdapter;
use crate::sources::table::{Column, Layout, Read};

const GARUDA: Layout = Layout {
    rows: "div.ar-list-item",
    pagination: ".pagination-text, div.text-center small",
    columns: &[
        Column::text("title", "div.ar-title a"),
        Column::read("author", "a.ar-author", Read::Labeled("Authors :")),
        Column::text("publisher", "a.ar-pub"),
        Column::text("journal", "a.ar-journal"),
        Column::text("year", "a.ar-year"),
        Column::read("doi", "a.ar-doi", Read::Labeled("DOI:")),
        Column::read("accreditation", "a.ar-quartile", Read::Labeled("Accred :")),
        Column::read("url", "div.ar-title a", Read::Link("href")),
    ],
};

impl ListingAdapter {
    /// Public source; no session is used.
    pub fn garuda(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Garuda, "garuda", &GARUDA, portal, client, max_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceAdapter;
    use crate::sources::table::parse_page;

    const PAGE: &str = r##"
    <html><body>
    <div class="ar-list-item mb-5">
      <div class="ar-title"><a href="https://garuda.kemdikbud.go.id/documents/detail/1234">Analisis sentimen ulasan</a></div>
      <div class="ar-meta">
        <a class="ar-author" href="#">Authors : Santoso B., Dewi S.</a>
        <a class="ar-pub" href="#">Universitas Contoh</a>
        <a class="ar-journal" href="#">Jurnal Teknologi Informasi</a>
      </div>
      <div class="ar-meta">
        <a class="ar-year" href="#"> 2022</a>
        <a class="ar-doi" href="#">DOI: 10.1234/jti.v5i2.99</a>
        <a class="ar-quartile" href="#">Accred : Sinta 3</a>
      </div>
    </div>
    <div class="ar-list-item mb-5">
      <div class="ar-title"><a href="/documents/detail/99">Tanpa DOI</a></div>
      <div class="ar-meta"><a class="ar-year" href="#">2017</a></div>
    </div>
    <div class="text-center"><small>Page 2 of 7 | Total Records : 68</small></div>
    </body></html>"##;

    #[test]
    fn test_garuda_items() {
        let adapter = ListingAdapter::garuda(PortalConfig::default(), reqwest::Client::new(), 10);
        assert_eq!(adapter.field(), SourceField::Garuda);
        assert!(!adapter.requires_session());

        let parsed = parse_page(
            PAGE,
            "https://sinta.kemdikbud.go.id/authors/profile/6005015?view=garuda&page=2",
            adapter.layout(),
        )
        .unwrap();
        assert_eq!(parsed.page_count, 7);
        assert_eq!(parsed.entries.len(), 2);

        let first = &parsed.entries[0];
        assert_eq!(first.text("title").unwrap(), "Analisis sentimen ulasan");
        assert_eq!(first.text("author").unwrap(), "Santoso B., Dewi S.");
        assert_eq!(first.text("publisher").unwrap(), "Universitas Contoh");
        assert_eq!(first.text("journal").unwrap(), "Jurnal Teknologi Informasi");
        assert_eq!(first.text("year").unwrap(), "2022");
        assert_eq!(first.text("doi").unwrap(), "10.1234/jti.v5i2.99");
        assert_eq!(first.text("accreditation").unwrap(), "Sinta 3");

        let second = &parsed.entries[1];
        assert_eq!(second.text("doi").unwrap(), "");
        assert_eq!(
            second.text("url").unwrap(),
            "https://sinta.kemdikbud.go.id/documents/detail/99"
        );
    }
}

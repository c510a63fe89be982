// src/sources/citations.rs

//! Citation-index listings (Scopus, Web of Science, Google Scholar).
//!
//! All three share the verification portal's publication table. They
//! differ in the author label, and in which `td` holds the year and the
//! citation count.

use crate::models::{PortalConfig, SourceField};
use crate::sources::ListingAdapter;
use crate::sources::table::{Column, Layout, Read};

const ROWS: &str = "div.table-responsive > table.table tr";
const PAGINATION: &str = "div.col-md-12 small";

const SCOPUS: Layout = Layout {
    rows: ROWS,
    pagination: PAGINATION,
    columns: &[
        Column::text("title", "a"),
        Column::read(
            "author",
            "td.text-lg-nowrap.text-nowrap small:nth-of-type(1)",
            Read::RequireLabel("Creator :"),
        ),
        Column::text("journal", "td.text-lg-nowrap.text-nowrap small:nth-of-type(2)"),
        Column::text("type", "td:nth-child(3) strong:nth-of-type(1)"),
        Column::text("year", "td:nth-child(3) strong:nth-of-type(2)"),
        Column::number("citations", "td:nth-child(4) strong"),
        Column::text("quartile", "td:nth-child(1) > div"),
        Column::read("url", "a", Read::Link("href")),
    ],
};

const WOS: Layout = Layout {
    rows: ROWS,
    pagination: PAGINATION,
    columns: &[
        Column::text("title", "a"),
        Column::read(
            "author",
            "td.text-lg-nowrap.text-nowrap small:nth-of-type(1)",
            Read::RequireLabel("Authors :"),
        ),
        Column::text("journal", "td.text-lg-nowrap.text-nowrap small:nth-of-type(2)"),
        Column::read("year", "td:nth-child(3) strong", Read::Tail(4)),
        Column::number("citations", "td:nth-child(4) strong"),
        Column::text("quartile", "td:nth-child(1) > div"),
        Column::read("url", "a", Read::Link("href")),
    ],
};

const GSCHOLAR: Layout = Layout {
    rows: ROWS,
    pagination: PAGINATION,
    columns: &[
        Column::text("title", "a"),
        Column::read(
            "author",
            "td.text-lg-nowrap.text-nowrap small:nth-of-type(1)",
            Read::RequireLabel("Author :"),
        ),
        Column::text("journal", "td.text-lg-nowrap.text-nowrap small:nth-of-type(2)"),
        Column::text("year", "td:nth-child(2) strong"),
        Column::number("citations", "td:nth-child(3) strong"),
        Column::read("url", "a", Read::Link("href")),
    ],
};

impl ListingAdapter {
    pub fn scopus(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Scopus, "scopus", &SCOPUS, portal, client, max_pages)
    }

    pub fn wos(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Wos, "wos", &WOS, portal, client, max_pages)
    }

    pub fn gscholar(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Gscholar, "google", &GSCHOLAR, portal, client, max_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceAdapter;
    use crate::sources::table::parse_page;

    const PAGE_URL: &str =
        "https://sinta.kemdikbud.go.id/authorverification/author/profile/6005015?view=scopus&page=1";

    fn adapter(build: fn(PortalConfig, reqwest::Client, usize) -> ListingAdapter) -> ListingAdapter {
        build(PortalConfig::default(), reqwest::Client::new(), 10)
    }

    const SCOPUS_PAGE: &str = r#"
    <html><body>
    <div class="col-md-12">
      <div></div>
      <div><div></div><div><small>Page 1 of 2 | Total Records : 12</small></div></div>
    </div>
    <div class="table-responsive"><table class="table">
      <tr><th>Q</th><th>Publication</th><th>Info</th><th>Cited</th></tr>
      <tr>
        <td><div>Q2</div></td>
        <td class="text-lg-nowrap text-nowrap">
          <a href="https://www.scopus.com/record/display.uri?eid=2-s2.0-1">Deep learning for rice</a>
          <small>Creator : Santoso B.</small>
          <small>Journal of Physics: Conference Series</small>
        </td>
        <td><strong>Conference Proceedi</strong> <strong>2021</strong></td>
        <td><strong>14</strong></td>
      </tr>
      <tr>
        <td><div>no-Q</div></td>
        <td class="text-lg-nowrap text-nowrap">
          <a href="/doc/2">Sensor fusion</a>
          <small>Vol 9, 2020</small>
        </td>
        <td><strong>Journal</strong></td>
        <td><strong></strong></td>
      </tr>
    </table></div>
    </body></html>"#;

    #[test]
    fn test_scopus_rows() {
        let a = adapter(ListingAdapter::scopus);
        assert_eq!(a.field(), SourceField::Scopus);
        assert!(a.requires_session());

        let parsed = parse_page(SCOPUS_PAGE, PAGE_URL, a.layout()).unwrap();
        assert_eq!(parsed.page_count, 2);
        assert_eq!(parsed.entries.len(), 2);

        let first = &parsed.entries[0];
        assert_eq!(first.text("title").unwrap(), "Deep learning for rice");
        assert_eq!(first.text("author").unwrap(), "Santoso B.");
        assert_eq!(
            first.text("journal").unwrap(),
            "Journal of Physics: Conference Series"
        );
        assert_eq!(first.text("type").unwrap(), "Conference Proceedi");
        assert_eq!(first.text("year").unwrap(), "2021");
        assert_eq!(first.get("citations"), Some(&serde_json::Value::from(14)));
        assert_eq!(first.text("quartile").unwrap(), "Q2");

        let second = &parsed.entries[1];
        assert_eq!(second.text("author").unwrap(), "");
        assert_eq!(second.text("year").unwrap(), "");
        assert_eq!(
            second.text("url").unwrap(),
            "https://sinta.kemdikbud.go.id/doc/2"
        );
        let columns: Vec<_> = second.columns().collect();
        assert_eq!(
            columns,
            ["title", "author", "journal", "type", "year", "citations", "quartile", "url"]
        );
    }

    #[test]
    fn test_wos_year_is_last_four_characters() {
        let page = r#"
        <div class="table-responsive"><table class="table">
          <tr>
            <td><div>Q1</div></td>
            <td class="text-lg-nowrap text-nowrap"><a href="x">Title</a>
              <small>Authors : Budi; Sari</small><small>IEEE Access</small></td>
            <td><strong>Published 2019-08-2022</strong></td>
            <td><strong>3</strong></td>
          </tr>
        </table></div>"#;
        let a = adapter(ListingAdapter::wos);
        let parsed = parse_page(page, PAGE_URL, a.layout()).unwrap();
        let entry = &parsed.entries[0];
        assert_eq!(entry.text("author").unwrap(), "Budi; Sari");
        assert_eq!(entry.text("year").unwrap(), "2022");
        assert_eq!(parsed.page_count, 1);
    }

    #[test]
    fn test_gscholar_columns() {
        let page = r#"
        <div class="table-responsive"><table class="table">
          <tr>
            <td class="text-lg-nowrap text-nowrap"><a href="https://scholar.google.com/c?x=1">Paper</a>
              <small>Author : S Budi, A Rahman</small><small>Jurnal Informatika 4 (2)</small></td>
            <td><strong>2018</strong></td>
            <td><strong>1,021</strong></td>
          </tr>
        </table></div>"#;
        let a = adapter(ListingAdapter::gscholar);
        let entry = &parse_page(page, PAGE_URL, a.layout()).unwrap().entries[0];
        assert_eq!(entry.text("author").unwrap(), "S Budi, A Rahman");
        assert_eq!(entry.text("year").unwrap(), "2018");
        assert_eq!(entry.get("citations"), Some(&serde_json::Value::from(1021)));
        assert!(entry.get("quartile").is_none());
    }
}

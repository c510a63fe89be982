// src/sources/portfolio.rs

//! Portfolio listings of the verification portal: books, intellectual
//! property, research grants and community service.

use crate::models::{PortalConfig, SourceField};
use crate::sources::ListingAdapter;
use crate::sources::table::{Column, Layout, Read};

const ROWS: &str = "div.table-responsive > table.table tr";
const PAGINATION: &str = "div.col-md-12 small";

const BOOK: Layout = Layout {
    rows: ROWS,
    pagination: PAGINATION,
    columns: &[
        Column::text("title", "td:nth-child(1) a"),
        Column::read("isbn", "td:nth-child(1) small:nth-of-type(1)", Read::Labeled("ISBN :")),
        Column::read(
            "author",
            "td:nth-child(1) small:nth-of-type(2)",
            Read::RequireLabel("Author :"),
        ),
        Column::read(
            "publisher",
            "td:nth-child(2) small:nth-of-type(1)",
            Read::Labeled("Publisher :"),
        ),
        Column::text("year", "td:nth-child(3) strong"),
        Column::read("city", "td:nth-child(2) small:nth-of-type(2)", Read::Labeled("City :")),
        Column::read("url", "td:nth-child(1) a", Read::Link("href")),
    ],
};

const IPR: Layout = Layout {
    rows: ROWS,
    pagination: PAGINATION,
    columns: &[
        Column::text("title", "td:nth-child(1) strong"),
        Column::read(
            "application_no",
            "td:nth-child(1) small:nth-of-type(1)",
            Read::Labeled("No. Permohonan :"),
        ),
        Column::read(
            "inventor",
            "td:nth-child(1) small:nth-of-type(2)",
            Read::Labeled("Inventor :"),
        ),
        Column::read(
            "patent_holder",
            "td:nth-child(1) small:nth-of-type(3)",
            Read::Labeled("Pemegang Paten :"),
        ),
        Column::text("category", "td:nth-child(2) strong"),
        Column::text("year", "td:nth-child(3) strong"),
        Column::text("status", "td:nth-child(4) strong"),
    ],
};

// Research grants and community service share one table shape.
const GRANT: Layout = Layout {
    rows: ROWS,
    pagination: PAGINATION,
    columns: &[
        Column::text("title", "td:nth-child(1) strong"),
        Column::read(
            "leader",
            "td:nth-child(1) small:nth-of-type(1)",
            Read::Labeled("Leader :"),
        ),
        Column::read(
            "personnel",
            "td:nth-child(1) small:nth-of-type(2)",
            Read::Labeled("Personils :"),
        ),
        Column::text("scheme", "td:nth-child(2) small:nth-of-type(1)"),
        Column::text("year", "td:nth-child(3) strong"),
        Column::amount("fund", "td:nth-child(4) strong"),
        Column::text("status", "td:nth-child(5) strong"),
        Column::read(
            "funding_source",
            "td:nth-child(2) small:nth-of-type(2)",
            Read::Labeled("Source :"),
        ),
    ],
};

impl ListingAdapter {
    pub fn book(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Book, "books", &BOOK, portal, client, max_pages)
    }

    pub fn ipr(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Ipr, "iprs", &IPR, portal, client, max_pages)
    }

    pub fn research(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Research, "researches", &GRANT, portal, client, max_pages)
    }

    pub fn service(portal: PortalConfig, client: reqwest::Client, max_pages: usize) -> Self {
        Self::new(SourceField::Service, "services", &GRANT, portal, client, max_pages)
    }
}

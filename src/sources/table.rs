// src/sources/table.rs

//! Paginated listing scraper shared by the tabular sources.
//!
//! Each source describes its listing as a [`Layout`]: which elements are
//! rows, and how every column is read from a row. Pages are fetched one at
//! a time; the HTML document never lives across an await point.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Entry, Record};
use crate::sources::Fetcher;
use crate::utils::{normalize_whitespace, resolve_url};

const PAGE_MARKER: &str = r"(?i)page\s*(\d+)\s*of\s*(\d+)";

/// How a cell value is taken from the matched element.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Read {
    /// Element text.
    Text,
    /// Element text with a leading label removed when present.
    Labeled(&'static str),
    /// Element text that must start with the label; otherwise the cell is
    /// something else (publication info in author slots) and reads empty.
    RequireLabel(&'static str),
    /// Last `n` characters of the text.
    Tail(usize),
    /// Attribute value, resolved as a URL against the page.
    Link(&'static str),
}

/// Value type written into the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Text,
    Number,
}

/// One column of a listing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    pub name: &'static str,
    pub selector: &'static str,
    pub read: Read,
    pub kind: Kind,
}

impl Column {
    pub const fn text(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            read: Read::Text,
            kind: Kind::Text,
        }
    }

    pub const fn number(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            read: Read::Text,
            kind: Kind::Number,
        }
    }

    /// Rupiah amount such as `Rp 25.000.000`.
    pub const fn amount(name: &'static str, selector: &'static str) -> Self {
        Self {
            name,
            selector,
            read: Read::Labeled("Rp"),
            kind: Kind::Number,
        }
    }

    pub const fn read(name: &'static str, selector: &'static str, read: Read) -> Self {
        Self {
            name,
            selector,
            read,
            kind: Kind::Text,
        }
    }
}

/// Shape of one source's listing pages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout {
    pub rows: &'static str,
    pub pagination: &'static str,
    pub columns: &'static [Column],
}

/// Rows of one parsed page plus the page count the page advertises.
#[derive(Debug)]
pub(crate) struct ParsedPage {
    pub entries: Vec<Entry>,
    pub page_count: usize,
}

/// Fetch every page of a listing and collect its rows in page order.
///
/// `view_url` already carries a query string; pages are addressed with
/// an extra `&page=N`.
pub(crate) async fn scrape_listing(
    fetcher: &Fetcher<'_>,
    view_url: &str,
    layout: &Layout,
    max_pages: usize,
) -> Result<Record> {
    let first_url = format!("{view_url}&page=1");
    let first = fetcher.get(&first_url).await?;
    let parsed = parse_page(&first.body, &first.url, layout)?;

    let mut page_count = parsed.page_count;
    if page_count > max_pages {
        log::warn!(
            "{} advertises {} pages, reading only the first {}",
            view_url,
            page_count,
            max_pages
        );
        page_count = max_pages;
    }

    let mut record: Record = parsed.entries.into_iter().collect();
    for page_no in 2..=page_count {
        log::debug!("Fetching page {page_no}/{page_count} of {view_url}");
        let page = fetcher.get(&format!("{view_url}&page={page_no}")).await?;
        for entry in parse_page(&page.body, &page.url, layout)?.entries {
            record.push(entry);
        }
    }

    Ok(record)
}

/// Parse one listing page.
pub(crate) fn parse_page(body: &str, page_url: &str, layout: &Layout) -> Result<ParsedPage> {
    let document = Html::parse_document(body);
    let base = Url::parse(page_url)?;
    let row_sel = parse_selector(layout.rows)?;
    let column_sels = layout
        .columns
        .iter()
        .map(|c| parse_selector(c.selector))
        .collect::<Result<Vec<_>>>()?;

    let mut entries = Vec::new();
    for row in document.select(&row_sel) {
        if let Some(entry) = read_row(&row, layout.columns, &column_sels, &base) {
            entries.push(entry);
        }
    }

    let page_count = page_count(&document, layout.pagination, page_url)?;
    Ok(ParsedPage {
        entries,
        page_count,
    })
}

/// Read one row; rows where every cell is empty (headers, spacers) are skipped.
fn read_row(
    row: &ElementRef,
    columns: &[Column],
    selectors: &[Selector],
    base: &Url,
) -> Option<Entry> {
    let mut entry = Entry::new();
    let mut any = false;

    for (column, selector) in columns.iter().zip(selectors) {
        let raw = row
            .select(selector)
            .next()
            .map(|el| read_cell(&el, column.read, base))
            .unwrap_or_default();
        any |= !raw.is_empty();
        entry = match column.kind {
            Kind::Text => entry.with_text(column.name, raw),
            Kind::Number => entry.with_number(column.name, &raw),
        };
    }

    any.then_some(entry)
}

fn read_cell(el: &ElementRef, read: Read, base: &Url) -> String {
    let text = || normalize_whitespace(&el.text().collect::<String>());
    match read {
        Read::Text => text(),
        Read::Labeled(label) => {
            let t = text();
            match t.strip_prefix(label) {
                Some(rest) => rest.trim().to_string(),
                None => t,
            }
        }
        Read::RequireLabel(label) => text()
            .strip_prefix(label)
            .map(|rest| rest.trim().to_string())
            .unwrap_or_default(),
        Read::Tail(n) => {
            let t = text();
            let skip = t.chars().count().saturating_sub(n);
            t.chars().skip(skip).collect()
        }
        Read::Link(attr) => el
            .value()
            .attr(attr)
            .map(|href| resolve_url(base, href.trim()))
            .unwrap_or_default(),
    }
}

/// Page count from the first `Page X of N` marker.
///
/// Other text that merely mentions a page (a journal "Homepage" in a row)
/// is ignored; a page without a marker is the only page. Text that opens
/// like a marker but has no readable count is an error.
fn page_count(document: &Html, selector: &str, page_url: &str) -> Result<usize> {
    let sel = parse_selector(selector)?;
    let pattern = Regex::new(PAGE_MARKER).map_err(|e| AppError::parse(page_url, e.to_string()))?;
    let texts: Vec<String> = document
        .select(&sel)
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .collect();

    let total = texts.iter().find_map(|text| {
        pattern
            .captures(text)
            .map(|caps| caps[2].parse::<usize>().map_err(|e| (caps[2].to_string(), e)))
    });

    match total {
        Some(Ok(total)) => Ok(total.max(1)),
        Some(Err((raw, e))) => Err(AppError::parse(page_url, format!("page count '{raw}': {e}"))),
        None => match texts.iter().find(|t| t.to_lowercase().starts_with("page")) {
            Some(marker) => Err(AppError::parse(
                page_url,
                format!("unreadable pagination '{marker}'"),
            )),
            None => Ok(1),
        },
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

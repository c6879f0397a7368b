//! HTML scraping for the two reference pages.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use crate::parser::CountryRecord;

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table tr").expect("Failed to parse row selector - this is a bug"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to parse cell selector - this is a bug"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to parse link selector - this is a bug"));

/// `loc242csv.zip` is the CSV edition of release 2024-2
static RELEASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(loc(\d{2})(\d)csv)\.zip").expect("Failed to compile release regex - this is a bug")
});

/// A UN/LOCODE release found on the download page
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    /// File stem, e.g. `loc242csv`; names the cache entries
    pub stem: String,
    /// Human form, e.g. `2024-2`
    pub version: String,
    pub url: Url,
}

/// Extract (name, alpha-2, alpha-3) from the first three cells of each table
/// row. Header rows, malformed codes and repeated alpha-2 codes are skipped.
pub fn parse_country_table(html: &str) -> Vec<CountryRecord> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in document.select(&ROW_SELECTOR) {
        let cells: Vec<String> = row.select(&CELL_SELECTOR).map(cell_text).collect();
        if cells.len() < 3 {
            continue;
        }

        let (name, alpha2, alpha3) = (&cells[0], &cells[1], &cells[2]);
        if name.is_empty() || !is_code(alpha2, 2) || !is_code(alpha3, 3) {
            continue;
        }

        if seen.insert(alpha2.clone()) {
            records.push(CountryRecord::new(name, alpha2, alpha3));
        }
    }

    records
}

/// Newest release linked from the UN/LOCODE download page. Relative links
/// are resolved against `base_url`.
pub fn find_latest_release(html: &str, base_url: &str) -> Result<Option<Release>> {
    let base = Url::parse(base_url).with_context(|| format!("Invalid page URL: {}", base_url))?;
    let document = Html::parse_document(html);
    let mut latest: Option<((u32, u32), Release)> = None;

    for link in document.select(&LINK_SELECTOR) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(caps) = RELEASE_RE.captures(href) else {
            continue;
        };

        let year: u32 = caps[2].parse()?;
        let issue: u32 = caps[3].parse()?;
        if latest.as_ref().is_some_and(|(key, _)| *key >= (year, issue)) {
            continue;
        }

        let url = base
            .join(href)
            .with_context(|| format!("Invalid release link: {}", href))?;
        let release = Release {
            stem: caps[1].to_ascii_lowercase(),
            version: format!("20{:02}-{}", year, issue),
            url,
        };
        latest = Some(((year, issue), release));
    }

    Ok(latest.map(|(_, release)| release))
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_code(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_uppercase())
}

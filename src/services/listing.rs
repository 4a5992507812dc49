// src/services/listing.rs

//! Listing page extraction.
//!
//! A catalog listing is a table whose course anchors sit in the left
//! column. Each anchor's row carries the course summary; the anchor's
//! link target decides structurally whether the entry is a standalone
//! course or a module expanding into a nested sub-listing.

use scraper::{ElementRef, Selector};

use crate::error::Result;
use crate::models::{CatalogEntry, CourseSummary, EntryKind};
use crate::render::Page;
use crate::services::{element_text, parse_selector};
use crate::utils::url::{module_target, resolve};

/// Label on the mandatory-flag cell marking a compulsory course.
const MANDATORY_LABEL: &str = "moduł obligatoryjny";

/// A listing row must expose this many cells to carry course data.
const MIN_ROW_CELLS: usize = 11;

/// Extracts catalog entries and course summaries from listing pages.
pub struct ListingExtractor {
    anchor: Selector,
    cell: Selector,
    image: Selector,
}

impl ListingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor: parse_selector("td.left > a")?,
            cell: parse_selector("td")?,
            image: parse_selector("img")?,
        })
    }

    /// Walk the listing anchors in document order and produce one entry
    /// per anchor, with addresses resolved against the page address.
    pub fn entries(&self, page: &Page) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();

        for anchor in page.select(&self.anchor) {
            let name = element_text(&anchor);
            if name.is_empty() {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            let summary = ancestor_row(&anchor).and_then(|row| self.summary(&row));

            let (kind, address) = match module_target(href) {
                Some(target) => (EntryKind::Module, resolve(page.url(), target)),
                None => (EntryKind::Course, resolve(page.url(), href)),
            };

            entries.push(CatalogEntry {
                name,
                address,
                kind,
                summary,
            });
        }

        entries
    }

    /// Parse one listing row into a course summary.
    ///
    /// Rows with fewer than eleven cells carry no course data (section
    /// headers, total lines) and yield `None`.
    pub fn summary(&self, row: &ElementRef) -> Option<CourseSummary> {
        let cells: Vec<ElementRef> = row.select(&self.cell).collect();
        if cells.len() < MIN_ROW_CELLS {
            return None;
        }

        let text = |idx: usize| element_text(&cells[idx]);

        let schedule = format!("W{} C{} L{} P{}", text(3), text(4), text(5), text(6));
        let has_exam = text(9).eq_ignore_ascii_case("t");

        // The mandatory flag is rendered as an icon where available; its
        // descriptive text wins over the cell text.
        let flag = cells[10]
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .map(|alt| alt.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_else(|| text(10));
        let mandatory = flag.to_lowercase() == MANDATORY_LABEL;

        Some(CourseSummary {
            semester_raw: text(0),
            name: text(2),
            schedule,
            total_hours: text(7),
            credits: text(8),
            has_exam,
            mandatory,
        })
    }

    /// Read the specialization label from the listing page, if present.
    pub fn label(&self, page: &Page, selector: &str) -> Option<String> {
        let parsed = match parse_selector(selector) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Bad label selector: {e}");
                return None;
            }
        };
        page.select(&parsed)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }
}

fn ancestor_row<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "tr")
}

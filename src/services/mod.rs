//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Catalog traversal (`CatalogCrawler`)
//! - Listing row extraction (`ListingExtractor`)
//! - Detail page extraction (`DetailExtractor`)
//! - Offline rule discovery (`RuleDiscovery`)

mod catalog;
mod detail;
mod discovery;
mod listing;

pub use catalog::{CatalogCrawler, canonical_name};
pub use detail::DetailExtractor;
pub use discovery::RuleDiscovery;
pub use listing::ListingExtractor;

use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Visible text of an element with whitespace collapsed.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

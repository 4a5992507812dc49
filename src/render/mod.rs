// src/render/mod.rs

//! Page renderer seam.
//!
//! The crawler never talks to the network directly; it asks a
//! [`PageRenderer`] for one rendered page at a time and queries the result
//! structurally. Navigation is strictly sequential against one renderer
//! session, so the trait is consumed from a single control flow and its
//! futures need not be `Send`.

mod http;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::Result;

pub use http::HttpRenderer;

/// A rendered page, queryable by CSS selector.
pub struct Page {
    url: String,
    document: Html,
}

impl Page {
    /// Parse raw HTML fetched from the given address.
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }

    /// Address this page was rendered from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// All elements matching the selector, in document order.
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.document.select(selector)
    }
}

/// Capability to fetch a URL and expose the rendered structure for query.
///
/// Waiting for the page to become queryable is the implementation's
/// concern, bounded by its own timeout; a timeout surfaces as an error the
/// caller handles at item granularity.
#[async_trait(?Send)]
pub trait PageRenderer {
    /// Navigate to the address and return the rendered page.
    async fn render(&self, url: &str) -> Result<Page>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_select() {
        let page = Page::parse("http://x/", "<table><tr><td>a</td><td>b</td></tr></table>");
        let cell = Selector::parse("td").unwrap();
        let texts: Vec<String> = page
            .select(&cell)
            .map(|el| el.text().collect::<String>())
            .collect();
        assert_eq!(texts, ["a", "b"]);
        assert_eq!(page.url(), "http://x/");
    }

    #[test]
    fn test_page_select_no_match() {
        let page = Page::parse("http://x/", "<p>none</p>");
        let sel = Selector::parse("table").unwrap();
        assert!(page.select(&sel).next().is_none());
    }
}

// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// # Examples
/// ```
/// use katalog::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://example.edu/path/", "page.html"),
///     "https://example.edu/path/page.html"
/// );
/// ```
pub fn resolve(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the sub-listing target from a module link.
///
/// Module entries do not link to a detail page; their href triggers an
/// in-page navigation action carrying the relative address of the module
/// listing, e.g. `javascript:plany_getLnk('plany.pl?...&P=M123')`.
/// Returns the embedded address, or `None` for ordinary course links.
pub fn module_target(href: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"plany_getLnk\('([^']+)'\)").expect("valid module link pattern"));
    pattern
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|target| target.as_str())
}

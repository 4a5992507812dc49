// src/services/discovery.rs

//! Offline rule discovery.
//!
//! Courses that recur across consecutive semesters appear once per term
//! in the top-level listing. This pass counts how often each name occurs
//! without navigating anywhere, so the rule file can be rebuilt with an
//! offset of `occurrences - 1` per recurring name.

use crate::error::Result;
use crate::render::PageRenderer;
use crate::services::ListingExtractor;

/// Counts name occurrences on the top-level listing.
pub struct RuleDiscovery<'a, R: PageRenderer> {
    renderer: &'a R,
    listing: ListingExtractor,
}

impl<'a, R: PageRenderer> RuleDiscovery<'a, R> {
    pub fn new(renderer: &'a R) -> Result<Self> {
        Ok(Self {
            renderer,
            listing: ListingExtractor::new()?,
        })
    }

    /// Occurrence count per lower-cased listing name, in first-seen order.
    ///
    /// Sub-courses rendered inline under their module already carry the
    /// module prefix, so names are counted as rendered; nothing is
    /// prefixed a second time.
    pub async fn count_names(&self, url: &str) -> Result<Vec<(String, usize)>> {
        let page = self.renderer.render(url).await?;
        let entries = self.listing.entries(&page);

        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in entries {
            let name = entry.name.to_lowercase();
            match counts.iter_mut().find(|(seen, _)| *seen == name) {
                Some(entry) => entry.1 += 1,
                None => counts.push((name, 1)),
            }
        }

        log::info!("Counted {} distinct names", counts.len());
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleSet;
    use crate::render::testing::StubRenderer;

    const URL: &str = "https://example.edu/plany.pl?K=F";

    fn row(name: &str, href: &str) -> String {
        format!(
            "<tr><td>1</td><td>1</td><td class=\"left\"><a href=\"{href}\">{name}</a></td>\
             <td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>1</td><td>N</td><td>x</td></tr>"
        )
    }

    fn listing(rows: &str) -> String {
        format!("<html><body><table>{rows}</table></body></html>")
    }

    #[tokio::test]
    async fn test_counts_in_first_seen_order() {
        let renderer = StubRenderer::new([(
            URL,
            listing(&[
                row("Język angielski", "plany.pl?C=1"),
                row("Fizyka", "plany.pl?C=2"),
                row("Język angielski", "plany.pl?C=3"),
                row("Język angielski", "plany.pl?C=4"),
            ]
            .concat()),
        )]);
        let discovery = RuleDiscovery::new(&renderer).unwrap();
        let counts = discovery.count_names(URL).await.unwrap();

        assert_eq!(
            counts,
            [
                ("język angielski".to_string(), 3),
                ("fizyka".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_counts_feed_rule_merge() {
        let renderer = StubRenderer::new([(
            URL,
            listing(&[
                row("WF", "plany.pl?C=1"),
                row("WF", "plany.pl?C=2"),
            ]
            .concat()),
        )]);
        let discovery = RuleDiscovery::new(&renderer).unwrap();
        let counts = discovery.count_names(URL).await.unwrap();

        let mut rules = RuleSet::default();
        let updated = rules.record_occurrences(counts.iter().map(|(n, c)| (n.as_str(), *c)));
        assert_eq!(updated, 1);
        assert_eq!(rules.range_offset("WF"), Some(1));
    }

    #[tokio::test]
    async fn test_prefixed_sub_rows_counted_as_rendered() {
        let renderer = StubRenderer::new([(
            URL,
            listing(&[
                row("Moduł A", "javascript:plany_getLnk('plany.pl?P=M1')"),
                row("Moduł A - Grafika", "plany.pl?C=1"),
                row("Moduł A - Grafika", "plany.pl?C=2"),
            ]
            .concat()),
        )]);
        let discovery = RuleDiscovery::new(&renderer).unwrap();
        let counts = discovery.count_names(URL).await.unwrap();

        assert_eq!(
            counts,
            [
                ("moduł a".to_string(), 1),
                ("moduł a - grafika".to_string(), 2),
            ]
        );
    }
}

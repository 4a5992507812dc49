// src/services/catalog.rs

//! Catalog crawler service.
//!
//! Walks the top-level listing, expands modules one level deep,
//! deduplicates by canonical name, and assembles one merged record per
//! course. Navigation is strictly sequential against a single renderer
//! session; only the top-level listing render is fatal, every other
//! failure is contained at item granularity.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::{
    CatalogEntry, Config, CourseRecord, CourseSummary, CrawlOutcome, EntryKind, RuleSet,
};
use crate::render::PageRenderer;
use crate::services::{DetailExtractor, ListingExtractor};

/// Crawls a course catalog into an ordered set of course records.
pub struct CatalogCrawler<'a, R: PageRenderer> {
    config: &'a Config,
    rules: &'a RuleSet,
    renderer: &'a R,
    listing: ListingExtractor,
    detail: DetailExtractor,
}

impl<'a, R: PageRenderer> CatalogCrawler<'a, R> {
    pub fn new(config: &'a Config, rules: &'a RuleSet, renderer: &'a R) -> Result<Self> {
        Ok(Self {
            config,
            rules,
            renderer,
            listing: ListingExtractor::new()?,
            detail: DetailExtractor::new()?,
        })
    }

    /// Run a full crawl. Records are committed in listing order, with
    /// module sub-entries interleaved at the point the module expands.
    pub async fn crawl(&self) -> Result<CrawlOutcome> {
        let listing_page = self.renderer.render(&self.config.catalog.url).await?;
        let specialization = self
            .listing
            .label(&listing_page, &self.config.catalog.label_selector);
        let entries = self.listing.entries(&listing_page);
        drop(listing_page);

        log::info!("Listing exposes {} entries", entries.len());

        let mut outcome = CrawlOutcome {
            specialization,
            ..CrawlOutcome::default()
        };
        outcome.stats.entries_total = entries.len();

        // Canonical names already committed, and modules already expanded.
        let mut committed: HashSet<String> = HashSet::new();
        let mut expanded: HashSet<String> = HashSet::new();

        let total = entries.len();
        for (idx, entry) in entries.into_iter().enumerate() {
            log::info!("[{}/{}] {}", idx + 1, total, entry.name);
            match entry.kind {
                EntryKind::Module => {
                    if !expanded.insert(entry.name.to_lowercase()) {
                        log::info!("Module {} already expanded, skipping", entry.name);
                        outcome.stats.duplicates_skipped += 1;
                        continue;
                    }
                    if let Err(e) = self.expand_module(&entry, &mut committed, &mut outcome).await
                    {
                        outcome.stats.failures += 1;
                        log::warn!("Failed to expand module {}: {}", entry.name, e);
                    }
                }
                EntryKind::Course => {
                    let canonical = entry.name.clone();
                    self.visit_course(canonical, &entry, &mut committed, &mut outcome)
                        .await;
                }
            }
        }

        Ok(outcome)
    }

    async fn expand_module(
        &self,
        module: &CatalogEntry,
        committed: &mut HashSet<String>,
        outcome: &mut CrawlOutcome,
    ) -> Result<()> {
        let page = self.renderer.render(&module.address).await?;
        let sub_entries = self.listing.entries(&page);
        drop(page);

        outcome.stats.modules_expanded += 1;
        log::info!("Module {} lists {} courses", module.name, sub_entries.len());

        for sub in sub_entries {
            if sub.kind == EntryKind::Module {
                log::warn!(
                    "Nested module {} inside {} not supported, skipping",
                    sub.name,
                    module.name
                );
                continue;
            }
            let canonical = canonical_name(&module.name, &sub.name);
            self.visit_course(canonical, &sub, committed, outcome).await;
        }

        Ok(())
    }

    /// Fetch, merge, and commit a single course unless its canonical name
    /// was already committed or its row carried no data.
    async fn visit_course(
        &self,
        canonical: String,
        entry: &CatalogEntry,
        committed: &mut HashSet<String>,
        outcome: &mut CrawlOutcome,
    ) {
        let key = canonical.to_lowercase();
        if committed.contains(&key) {
            log::info!("{canonical} already collected, skipping");
            outcome.stats.duplicates_skipped += 1;
            return;
        }

        let Some(summary) = &entry.summary else {
            log::debug!("Row for {canonical} exposes no course data, skipping");
            outcome.stats.rows_without_data += 1;
            return;
        };

        match self.collect(&canonical, entry, summary).await {
            Ok(record) => {
                committed.insert(key);
                outcome.records.push(record);
            }
            Err(e) => {
                outcome.stats.failures += 1;
                log::warn!("Failed to collect {canonical}: {e}");
            }
        }
    }

    async fn collect(
        &self,
        canonical: &str,
        entry: &CatalogEntry,
        summary: &CourseSummary,
    ) -> Result<CourseRecord> {
        let page = self.renderer.render(&entry.address).await?;
        let detail = self.detail.extract(&page);
        drop(page);

        // Range rules target the canonical name; a rule written for a bare
        // course name still applies when the course sits inside a module.
        let rule_name = if self.rules.range_offset(canonical).is_some() {
            canonical
        } else {
            summary.name.as_str()
        };
        let semester = self.rules.normalize_semester(rule_name, &summary.semester_raw);

        Ok(CourseRecord::assemble(canonical, semester, summary, detail))
    }
}

/// Fully-qualified course identity for a course reached through a module.
///
/// Sub-courses occasionally render with the module prefix already in
/// place; those keep their name as-is instead of gaining it twice.
pub fn canonical_name(module: &str, sub: &str) -> String {
    let prefix = format!("{module} - ").to_lowercase();
    if sub.to_lowercase().starts_with(&prefix) {
        sub.to_string()
    } else {
        format!("{module} - {sub}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::StubRenderer;

    const LISTING_URL: &str =
        "https://example.edu/plany.pl?lng=PL&W=E&K=F&KW=&TK=html&S=70&P=&C=2023&erasmus=&O=";

    fn course_row(semester: &str, name: &str, href: &str) -> String {
        format!(
            "<tr><td>{semester}</td><td>1</td><td class=\"left\"><a href=\"{href}\">{name}</a></td>\
             <td>30</td><td>15</td><td>0</td><td>0</td><td>45</td><td>4</td><td>T</td>\
             <td>Moduł obligatoryjny</td></tr>"
        )
    }

    fn module_row(semester: &str, name: &str, target: &str) -> String {
        course_row(
            semester,
            name,
            &format!("javascript:plany_getLnk('{target}')"),
        )
    }

    fn short_row(name: &str, href: &str) -> String {
        format!("<tr><td>1</td><td class=\"left\"><a href=\"{href}\">{name}</a></td><td>x</td></tr>")
    }

    fn page(rows: &str) -> String {
        format!("<html><body><h3>Informatyka</h3><table>{rows}</table></body></html>")
    }

    fn detail_page(department: &str) -> String {
        format!(
            "<html><body>\
             <div><span>Nazwa jednostki prowadzącej zajęcia:</span></div>\
             <div><b>{department}</b></div>\
             </body></html>"
        )
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.catalog.url = LISTING_URL.to_string();
        config
    }

    async fn run(renderer: &StubRenderer, rules: &RuleSet) -> CrawlOutcome {
        let config = test_config();
        let crawler = CatalogCrawler::new(&config, rules, renderer).unwrap();
        crawler.crawl().await.unwrap()
    }

    #[test]
    fn test_canonical_name_prefixing() {
        assert_eq!(canonical_name("Moduł A", "Grafika"), "Moduł A - Grafika");
        assert_eq!(canonical_name("Moduł A", "Moduł A - Grafika"), "Moduł A - Grafika");
        assert_eq!(canonical_name("Moduł A", "moduł a - Grafika"), "moduł a - Grafika");
    }

    #[tokio::test]
    async fn test_duplicate_rows_commit_once() {
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&[
                    course_row("1", "Seminarium", "plany.pl?C=1"),
                    course_row("2", "Seminarium", "plany.pl?C=1b"),
                ]
                .concat()),
            ),
            ("https://example.edu/plany.pl?C=1", detail_page("KI")),
            ("https://example.edu/plany.pl?C=1b", detail_page("KI")),
        ]);
        let outcome = run(&renderer, &RuleSet::default()).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "Seminarium");
        assert_eq!(outcome.stats.duplicates_skipped, 1);
        // The duplicate is skipped before any navigation
        assert!(
            !renderer
                .visits()
                .contains(&"https://example.edu/plany.pl?C=1b".to_string())
        );
    }

    #[tokio::test]
    async fn test_module_expansion_and_prefix_guard() {
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&module_row("1", "Moduł A", "plany.pl?P=M1")),
            ),
            (
                "https://example.edu/plany.pl?P=M1",
                page(&[
                    course_row("1", "Moduł A - Grafika", "plany.pl?C=10"),
                    course_row("2", "Animacja", "plany.pl?C=11"),
                ]
                .concat()),
            ),
            ("https://example.edu/plany.pl?C=10", detail_page("KG")),
            ("https://example.edu/plany.pl?C=11", detail_page("KG")),
        ]);
        let outcome = run(&renderer, &RuleSet::default()).await;

        let names: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Moduł A - Grafika", "Moduł A - Animacja"]);
        assert_eq!(outcome.stats.modules_expanded, 1);
        assert_eq!(outcome.records[0].department, "KG");
    }

    #[tokio::test]
    async fn test_module_expanded_at_most_once() {
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&[
                    module_row("1", "Moduł A", "plany.pl?P=M1"),
                    module_row("3", "Moduł A", "plany.pl?P=M1"),
                ]
                .concat()),
            ),
            (
                "https://example.edu/plany.pl?P=M1",
                page(&course_row("1", "Grafika", "plany.pl?C=10")),
            ),
            ("https://example.edu/plany.pl?C=10", detail_page("KG")),
        ]);
        let outcome = run(&renderer, &RuleSet::default()).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.stats.duplicates_skipped, 1);
        let module_visits = renderer
            .visits()
            .iter()
            .filter(|url| url.as_str() == "https://example.edu/plany.pl?P=M1")
            .count();
        assert_eq!(module_visits, 1);
    }

    #[tokio::test]
    async fn test_module_failure_does_not_stop_crawl() {
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&[
                    module_row("1", "Moduł zepsuty", "plany.pl?P=M404"),
                    course_row("2", "Fizyka", "plany.pl?C=2"),
                ]
                .concat()),
            ),
            ("https://example.edu/plany.pl?C=2", detail_page("KF")),
        ]);
        let outcome = run(&renderer, &RuleSet::default()).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].name, "Fizyka");
        assert_eq!(outcome.stats.failures, 1);
    }

    #[tokio::test]
    async fn test_semester_normalized_with_rules() {
        let rules = RuleSet::from_parts(
            [("algorytmy".to_string(), 2)],
            ["algorytmy".to_string()],
        );
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&course_row("3", "Algorytmy", "plany.pl?C=5")),
            ),
            ("https://example.edu/plany.pl?C=5", detail_page("KI")),
        ]);
        let outcome = run(&renderer, &rules).await;

        assert_eq!(outcome.records[0].semester, "3 - 5");
    }

    #[tokio::test]
    async fn test_rule_for_bare_name_applies_inside_module() {
        let rules = RuleSet::from_parts(
            [("algorytmy".to_string(), 2)],
            ["algorytmy".to_string()],
        );
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&module_row("1", "Moduł B", "plany.pl?P=M2")),
            ),
            (
                "https://example.edu/plany.pl?P=M2",
                page(&course_row("3", "Algorytmy", "plany.pl?C=6")),
            ),
            ("https://example.edu/plany.pl?C=6", detail_page("KI")),
        ]);
        let outcome = run(&renderer, &rules).await;

        assert_eq!(outcome.records[0].name, "Moduł B - Algorytmy");
        assert_eq!(outcome.records[0].semester, "3 - 5");
    }

    #[tokio::test]
    async fn test_rule_for_module_name_applies_to_sub_courses() {
        let rules = RuleSet::from_parts(
            [("moduł b".to_string(), 1)],
            ["moduł b".to_string()],
        );
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&module_row("1", "Moduł B", "plany.pl?P=M2")),
            ),
            (
                "https://example.edu/plany.pl?P=M2",
                page(&course_row("5", "Animacja", "plany.pl?C=7")),
            ),
            ("https://example.edu/plany.pl?C=7", detail_page("KG")),
        ]);
        let outcome = run(&renderer, &rules).await;

        assert_eq!(outcome.records[0].semester, "5 - 6");
    }

    #[tokio::test]
    async fn test_non_integer_semester_left_unchanged() {
        let rules = RuleSet::from_parts(
            [("wf".to_string(), 1)],
            ["wf".to_string()],
        );
        let renderer = StubRenderer::new([
            (LISTING_URL, page(&course_row("letni", "WF", "plany.pl?C=8"))),
            ("https://example.edu/plany.pl?C=8", detail_page("SWFiS")),
        ]);
        let outcome = run(&renderer, &rules).await;

        assert_eq!(outcome.records[0].semester, "letni");
    }

    #[tokio::test]
    async fn test_row_without_data_skipped() {
        let renderer = StubRenderer::new([
            (
                LISTING_URL,
                page(&[
                    short_row("Nagłówek sekcji", "plany.pl?C=9"),
                    course_row("1", "Analiza", "plany.pl?C=10"),
                ]
                .concat()),
            ),
            ("https://example.edu/plany.pl?C=10", detail_page("KM")),
        ]);
        let outcome = run(&renderer, &RuleSet::default()).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.stats.rows_without_data, 1);
        // No detail fetch for the dataless row
        assert!(
            !renderer
                .visits()
                .contains(&"https://example.edu/plany.pl?C=9".to_string())
        );
    }

    #[tokio::test]
    async fn test_specialization_label_captured() {
        let renderer = StubRenderer::new([
            (LISTING_URL, page("")),
        ]);
        let outcome = run(&renderer, &RuleSet::default()).await;
        assert_eq!(outcome.specialization, Some("Informatyka".to_string()));
    }

    #[tokio::test]
    async fn test_top_listing_failure_is_fatal() {
        let renderer = StubRenderer::new([]);
        let config = test_config();
        let rules = RuleSet::default();
        let crawler = CatalogCrawler::new(&config, &rules, &renderer).unwrap();
        assert!(crawler.crawl().await.is_err());
    }
}

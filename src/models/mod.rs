// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod course;
mod rules;

// Re-export all public types
pub use config::{CatalogConfig, Config, CrawlerConfig, OutputConfig};
pub use course::{CatalogEntry, CourseDetail, CourseRecord, CourseSummary, EntryKind};
pub use rules::RuleSet;

/// Aggregate result of a catalog crawl.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Committed records, in commit order.
    pub records: Vec<CourseRecord>,

    /// Specialization label read from the listing page, if any.
    pub specialization: Option<String>,

    /// Run statistics.
    pub stats: CrawlStats,
}

/// Counters describing a crawl run.
#[derive(Debug, Default)]
pub struct CrawlStats {
    /// Top-level entries seen in the listing.
    pub entries_total: usize,

    /// Modules navigated into.
    pub modules_expanded: usize,

    /// Entries and sub-entries skipped because their canonical name was
    /// already committed (or the module was already expanded).
    pub duplicates_skipped: usize,

    /// Rows that exposed no course data and were passed over.
    pub rows_without_data: usize,

    /// Per-item extraction or navigation failures.
    pub failures: usize,
}

// src/output/mod.rs

//! Output partitioning and table writing.
//!
//! The assembled records split into two tables around a semester
//! threshold: the common curriculum of the first study years, and the
//! specialization part named after the label found on the listing page.
//! Files are written atomically (temp file + rename); a JSON snapshot of
//! the full record set is kept alongside the tables.

pub mod csv;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{CourseRecord, CrawlOutcome, OutputConfig};
use crate::utils::sanitize_file_stem;

/// Records split by the semester threshold.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    /// Semester key at or below the threshold, or no parsable key.
    pub core: Vec<&'a CourseRecord>,

    /// Semester key above the threshold.
    pub specialization: Vec<&'a CourseRecord>,
}

/// Split records around the threshold on the leading semester token.
///
/// Records without a parsable key always land in the core bucket.
pub fn partition(records: &[CourseRecord], threshold: u32) -> Partition<'_> {
    let mut split = Partition::default();
    for record in records {
        match record.semester_key() {
            Some(key) if key > threshold => split.specialization.push(record),
            _ => split.core.push(record),
        }
    }
    split
}

/// Header for the JSON snapshot written next to the tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// ISO 8601 timestamp of the crawl
    pub updated_at: DateTime<Utc>,
    /// Total record count
    pub count: usize,
    /// The records, in commit order
    pub records: Vec<CourseRecord>,
}

impl Snapshot {
    pub fn new(records: &[CourseRecord]) -> Self {
        Self {
            updated_at: Utc::now(),
            count: records.len(),
            records: records.to_vec(),
        }
    }
}

/// Paths and row counts of a completed write.
#[derive(Debug)]
pub struct WriteSummary {
    pub core_path: PathBuf,
    pub specialization_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub core_rows: usize,
    pub specialization_rows: usize,
}

/// Partition the crawl outcome and write both tables plus the snapshot.
pub async fn write_tables(
    outcome: &CrawlOutcome,
    config: &OutputConfig,
    base_dir: &Path,
) -> Result<WriteSummary> {
    let dir = base_dir.join(&config.dir);
    tokio::fs::create_dir_all(&dir).await?;

    let split = partition(&outcome.records, config.semester_threshold);

    let core_path = dir.join(format!("{}.csv", config.core_table));
    write_atomic(&core_path, csv::render_records(split.core.iter().copied()).as_bytes()).await?;

    let specialization_stem = outcome
        .specialization
        .as_deref()
        .map(sanitize_file_stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| config.fallback_table.clone());
    let specialization_path = dir.join(format!("{specialization_stem}.csv"));
    write_atomic(
        &specialization_path,
        csv::render_records(split.specialization.iter().copied()).as_bytes(),
    )
    .await?;

    let snapshot_path = dir.join("catalog.json");
    let snapshot = Snapshot::new(&outcome.records);
    write_atomic(&snapshot_path, &serde_json::to_vec_pretty(&snapshot)?).await?;

    Ok(WriteSummary {
        core_path,
        specialization_path,
        snapshot_path,
        core_rows: split.core.len(),
        specialization_rows: split.specialization.len(),
    })
}

/// Write bytes atomically (write to temp, then rename).
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

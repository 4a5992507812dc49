//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Catalog location and page structure settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Output partitioning settings
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.catalog.url.trim().is_empty() {
            return Err(AppError::validation("catalog.url is empty"));
        }
        if self.output.semester_threshold == 0 {
            return Err(AppError::validation(
                "output.semester_threshold must be > 0",
            ));
        }
        if self.output.core_table.trim().is_empty() {
            return Err(AppError::validation("output.core_table is empty"));
        }
        if self.output.fallback_table.trim().is_empty() {
            return Err(AppError::validation("output.fallback_table is empty"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between navigations in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Catalog location and page structure settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL of the top-level catalog listing
    #[serde(default = "defaults::catalog_url")]
    pub url: String,

    /// CSS selector for the specialization label on the listing page
    #[serde(default = "defaults::label_selector")]
    pub label_selector: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: defaults::catalog_url(),
            label_selector: defaults::label_selector(),
        }
    }
}

/// Output partitioning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated tables, relative to the data directory
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    /// Records whose semester starts at or below this go to the core table
    #[serde(default = "defaults::semester_threshold")]
    pub semester_threshold: u32,

    /// File stem for the core (low-semester) table
    #[serde(default = "defaults::core_table")]
    pub core_table: String,

    /// File stem for the specialization table when no label was found
    #[serde(default = "defaults::fallback_table")]
    pub fallback_table: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            semester_threshold: defaults::semester_threshold(),
            core_table: defaults::core_table(),
            fallback_table: defaults::fallback_table(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        format!("katalog-crawler/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn request_delay() -> u64 {
        1000
    }

    pub fn catalog_url() -> String {
        "https://krk.prz.edu.pl/plany.pl?lng=PL&W=E&K=F&KW=&TK=html&S=70&P=&C=2023&erasmus=&O="
            .to_string()
    }

    pub fn label_selector() -> String {
        "h3".to_string()
    }

    pub fn output_dir() -> String {
        "output".to_string()
    }

    pub fn semester_threshold() -> u32 {
        4
    }

    pub fn core_table() -> String {
        "przedmioty-sem-1-4".to_string()
    }

    pub fn fallback_table() -> String {
        "specjalnosc".to_string()
    }
}

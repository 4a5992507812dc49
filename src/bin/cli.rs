//! Katalog CLI
//!
//! Crawls a university course catalog and exports curriculum tables
//! partitioned by study year.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use katalog::{
    error::Result,
    models::{Config, RuleSet},
    output,
    render::HttpRenderer,
    services::{CatalogCrawler, RuleDiscovery},
};

/// Katalog - University Course Catalog Crawler
#[derive(Parser, Debug)]
#[command(name = "katalog", version, about = "University course catalog crawler")]
struct Cli {
    /// Path to data directory containing config and rule files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the catalog and write partitioned tables
    Crawl {
        /// Override the top-level listing URL from config
        #[arg(long)]
        url: Option<String>,
    },

    /// Rebuild semester-range rules from repeated listing names
    Rules {
        /// Print discovered rules without writing rules.toml
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration files
    Validate,

    /// Show configuration and rule table summary
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Katalog crawler starting...");

    let config_path = cli.data_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    let rules_path = cli.data_dir.join("rules.toml");

    match cli.command {
        Command::Crawl { url } => {
            if let Some(url) = url {
                config.catalog.url = url;
            }
            config.validate()?;

            let rules = RuleSet::load_or_default(&rules_path);
            log::info!(
                "Loaded {} range rules and {} special courses",
                rules.range_count(),
                rules.special_count()
            );

            let renderer = HttpRenderer::new(&config.crawler)?;
            let crawler = CatalogCrawler::new(&config, &rules, &renderer)?;
            let outcome = crawler.crawl().await?;

            log::info!(
                "Collected {} records ({} duplicates skipped, {} rows without data, {} failures)",
                outcome.records.len(),
                outcome.stats.duplicates_skipped,
                outcome.stats.rows_without_data,
                outcome.stats.failures
            );

            let summary = output::write_tables(&outcome, &config.output, &cli.data_dir).await?;
            log::info!(
                "Wrote {} rows to {}",
                summary.core_rows,
                summary.core_path.display()
            );
            log::info!(
                "Wrote {} rows to {}",
                summary.specialization_rows,
                summary.specialization_path.display()
            );
            log::info!("Snapshot at {}", summary.snapshot_path.display());
        }

        Command::Rules { dry_run } => {
            config.validate()?;

            let renderer = HttpRenderer::new(&config.crawler)?;
            let discovery = RuleDiscovery::new(&renderer)?;
            let counts = discovery.count_names(&config.catalog.url).await?;

            let mut rules = RuleSet::load_or_default(&rules_path);
            let updated = rules.record_occurrences(counts.iter().map(|(n, c)| (n.as_str(), *c)));
            log::info!("{updated} recurring names found");

            for (name, count) in counts.iter().filter(|(_, count)| *count > 1) {
                log::info!("  {name}: {count} occurrences");
            }

            if dry_run {
                log::info!("Dry run, rules file left untouched");
            } else {
                rules.save(&rules_path)?;
                log::info!("Rules saved to {}", rules_path.display());
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {e}");
                return Err(e);
            }
            log::info!("✓ Config OK");

            if rules_path.exists() {
                let rules = RuleSet::load(&rules_path)?;
                log::info!(
                    "✓ Rules OK ({} ranges, {} special courses)",
                    rules.range_count(),
                    rules.special_count()
                );
            } else {
                log::warn!(
                    "Rules file not found at {}; the crawl will run with empty rule tables",
                    rules_path.display()
                );
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            let rules = RuleSet::load_or_default(&rules_path);
            log::info!("Data directory: {}", cli.data_dir.display());
            log::info!("Catalog URL: {}", config.catalog.url);
            log::info!(
                "Rules: {} ranges, {} special courses",
                rules.range_count(),
                rules.special_count()
            );
            log::info!(
                "Output: {}/ (threshold: semester {})",
                cli.data_dir.join(&config.output.dir).display(),
                config.output.semester_threshold
            );
        }
    }

    Ok(())
}

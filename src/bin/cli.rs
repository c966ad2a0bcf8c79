//! coursefeed CLI
//!
//! Local entry point for running aggregation queries against the live
//! provider catalogs.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use unicode_segmentation::UnicodeSegmentation;

use coursefeed::{
    departments::DepartmentCatalog,
    error::Result,
    models::{Config, Department},
    pipeline::{Aggregator, CourseResult, ResultSink, SearchRequest},
};

/// Instructor bios longer than this are elided for display.
const BIO_DISPLAY_LIMIT: usize = 150;

/// coursefeed - online course search across MOOC providers
#[derive(Parser, Debug)]
#[command(
    name = "coursefeed",
    version,
    about = "Searches online-course catalogs across MOOC providers"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the enabled provider catalogs
    Search {
        /// Free-text query; empty lists everything
        query: Vec<String>,

        /// Restrict results to one department id (see `departments`)
        #[arg(short, long, default_value = "")]
        department: String,
    },

    /// List the selectable department taxonomy
    Departments,

    /// List providers and whether they are enabled
    Providers,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Sink that prints grouped results to stdout as they arrive.
#[derive(Default)]
struct ConsoleSink;

impl ResultSink for ConsoleSink {
    fn register_departments(&mut self, _root: &Department, _children: &[&Department]) {}

    fn register_source(&mut self, _key: &str, title: &str, _template: &str) {
        println!("\n=== {title} ===");
    }

    fn push(&mut self, result: CourseResult) -> bool {
        println!("- {}", result.title);
        println!("  {}", result.uri);
        if !result.headline.is_empty() {
            println!("  {}", result.headline);
        }
        if !result.extra.is_empty() {
            println!("  {}", result.extra);
        }
        if let Some(video) = &result.video_url {
            println!("  video: {video}");
        }
        if !result.departments.is_empty() {
            println!("  departments: {}", result.departments);
        }
        for (name, bio) in result.instructor_names.iter().zip(&result.instructor_bios) {
            if bio.is_empty() {
                println!("  instructor: {name}");
            } else {
                println!("  instructor: {name} ({})", truncate_bio(bio, BIO_DISPLAY_LIMIT));
            }
        }
        true
    }
}

/// Elide a bio at `limit` graphemes so multi-byte text never splits.
fn truncate_bio(bio: &str, limit: usize) -> String {
    let graphemes: Vec<&str> = bio.graphemes(true).collect();
    if graphemes.len() <= limit {
        bio.to_string()
    } else {
        format!("{}...", graphemes[..limit].concat())
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Arc::new(Config::load_or_default(&cli.config));

    match cli.command {
        Command::Search { query, department } => {
            config.validate()?;

            let aggregator = Aggregator::new(Arc::clone(&config))?;
            if !department.is_empty() && aggregator.catalog().get(&department).is_none() {
                log::warn!("Unknown department id {department:?}; nothing will match it");
            }

            let request = SearchRequest {
                query: query.join(" "),
                department,
            };
            let mut sink = ConsoleSink;
            let stats = aggregator.run(&request, &mut sink).await?;

            println!();
            log::info!(
                "{} results from {} sources in {}ms ({} duplicates suppressed, {} filtered)",
                stats.emitted,
                stats.sources,
                (stats.finished_at - stats.started_at).num_milliseconds(),
                stats.duplicates,
                stats.filtered
            );
        }

        Command::Departments => {
            let catalog = DepartmentCatalog::new();
            println!("{:<12} {}", "(all)", catalog.root().label);
            for dept in catalog.top_level() {
                println!("{:<12} {}", dept.id, dept.label);
            }
        }

        Command::Providers => {
            let aggregator = Aggregator::new(Arc::clone(&config))?;
            for client in aggregator.clients() {
                let key = client.name().to_lowercase();
                let state = if config.providers.is_enabled(&key) {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("{:<14} {state}", client.name());
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_bio_elides_long_text() {
        let short = "short bio";
        assert_eq!(truncate_bio(short, 150), short);

        let long = "x".repeat(200);
        let truncated = truncate_bio(&long, 150);
        assert_eq!(truncated.len(), 153);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncate_bio_respects_grapheme_boundaries() {
        let text = "é".repeat(10);
        let truncated = truncate_bio(&text, 5);
        assert_eq!(truncated, format!("{}...", "é".repeat(5)));
    }
}

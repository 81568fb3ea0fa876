//! Audit-Scout main entry point
//!
//! Command-line front end for running a single discovery and printing the
//! curated pages as JSON.

use anyhow::Context;
use audit_scout::config::{load_config_with_hash, Config};
use audit_scout::sitemap::sitemap_url_for;
use audit_scout::Discoverer;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Audit-Scout: curated page discovery for accessibility audits
///
/// Resolves a site's sitemap, asks a text-generation service to pick and
/// categorize the pages most worth auditing, and checks that each one is
/// reachable.
#[derive(Parser, Debug)]
#[command(name = "audit-scout")]
#[command(version)]
#[command(about = "Curated page discovery for accessibility audits", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root URL of the site to discover
    #[arg(long, value_name = "URL")]
    site: String,

    /// Category hint for the site (e.g. "e-commerce", "news")
    #[arg(long, default_value = "")]
    category: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration and sitemap location without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        return handle_dry_run(&config, &cli.site, &cli.category);
    }

    handle_discover(&config, &cli.site, &cli.category).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("audit_scout=info,warn"),
            1 => EnvFilter::new("audit_scout=debug,info"),
            2 => EnvFilter::new("audit_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: prints what a discovery would use
fn handle_dry_run(config: &Config, site: &str, category: &str) -> anyhow::Result<()> {
    println!("=== Audit-Scout Dry Run ===\n");
    println!("Site: {}", site);
    println!("Category: {}", if category.is_empty() { "(none)" } else { category });
    println!("Sitemap: {}\n", sitemap_url_for(site));

    let rendered =
        toml::to_string_pretty(config).context("failed to render effective configuration")?;
    println!("Effective configuration:\n\n{}", rendered);

    if std::env::var(&config.curation.api_key_env).is_err() {
        println!(
            "! {} is not set; discovery would fail at the curation step",
            config.curation.api_key_env
        );
    }

    Ok(())
}

/// Handles the main discovery operation
async fn handle_discover(config: &Config, site: &str, category: &str) -> anyhow::Result<()> {
    let discoverer = Discoverer::from_config(config).context("failed to set up discovery")?;

    let results = match discoverer.discover(site, category).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Discovery failed: {}", e);
            return Err(e).context(format!("discovery failed for {}", site));
        }
    };

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

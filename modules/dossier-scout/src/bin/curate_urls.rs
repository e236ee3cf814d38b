//! Diagnostic tool: run the reference-URL pipeline on a list of URLs and show
//! what each stage did with them.
//!
//! Usage: cargo run --bin curate-urls -- "Jane Doe" https://www.imdb.com/name/nm0000001/ ...

use anyhow::Result;
use clap::Parser;
use dossier_common::Config;
use dossier_links::UrlCurator;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "curate-urls", about = "Classify, probe and rank reference URLs for one entity")]
struct Cli {
    /// Entity name, used to vet URLs on unknown domains.
    name: String,

    /// Candidate URLs, highest priority first.
    #[arg(required = true)]
    urls: Vec<String>,

    /// Maximum number of ranked URLs (defaults to DOSSIER_URL_LIMIT).
    #[arg(long)]
    limit: Option<usize>,

    /// Print the full result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dossier=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.log_summary();

    let curator = UrlCurator::from_config(&config)?;
    let limit = cli.limit.unwrap_or(config.url_limit);
    let curation = curator.curate(&cli.urls, limit, &cli.name).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&curation)?);
        return Ok(());
    }

    println!("Candidates ({}):", curation.candidates.len());
    for candidate in &curation.candidates {
        println!(
            "  {:<10} {:<16} {:<9} shaped={:<5} {}",
            format!("{:?}", candidate.reachability),
            candidate.domain_key,
            format!("{:?}", candidate.class),
            candidate.is_profile_shaped,
            candidate.normalized,
        );
    }

    println!("\nRanked ({} of max {limit}):", curation.ranked.len());
    for (i, url) in curation.ranked.iter().enumerate() {
        println!("  {:>2}. {url}", i + 1);
    }

    Ok(())
}

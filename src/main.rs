//! page-pipeline: turn one raw product record into structured marketing pages.
//!
//! Usage:
//!   page-pipeline --input demos/glowboost.json
//!   page-pipeline --input demos/glowboost.json --pages faq --format markdown
//!   page-pipeline --input demos/glowboost.json --template demos/mini_page.toml --dry-run

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use page_pipeline::analyst::{RawProductRecord, normalize};
use page_pipeline::config::Config;
use page_pipeline::content::PageTemplate;
use page_pipeline::content::templates::builtin_names;
use page_pipeline::{OutputFormat, Pipeline, write_pages};

#[derive(Parser)]
#[command(name = "page-pipeline")]
#[command(about = "Generate FAQ, product and comparison pages from a product record", long_about = None)]
struct Cli {
    /// Raw product record (JSON object keyed by sheet column names)
    #[arg(long)]
    input: PathBuf,

    /// Comma-separated built-in page types
    #[arg(long, value_delimiter = ',')]
    pages: Vec<String>,

    /// Extra template file (.toml or .json); may be repeated
    #[arg(long = "template")]
    templates: Vec<PathBuf>,

    /// Output directory (defaults to pipeline.output_dir)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// json or markdown
    #[arg(long, default_value = "json")]
    format: OutputFormat,

    /// Resolve templates and normalize the product without calling the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("page_pipeline=info")),
        )
        .with_target(false)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input {}", cli.input.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).context("Input is not valid JSON")?;
    let raw = RawProductRecord::from_json(&value)?;

    let registry = page_pipeline::content::LogicRegistry::default();
    let mut page_types = cli.pages.clone();
    if page_types.is_empty() && cli.templates.is_empty() {
        page_types = builtin_names().into_iter().map(String::from).collect();
    }
    let mut templates = Vec::new();
    for name in &page_types {
        templates.push(PageTemplate::builtin(name.trim(), &registry)?);
    }
    for path in &cli.templates {
        templates.push(
            PageTemplate::load(path, &registry)
                .with_context(|| format!("Failed to load template {}", path.display()))?,
        );
    }

    if cli.dry_run {
        let product = normalize(&raw)?;
        println!("{}", serde_json::to_string_pretty(&product)?);
        for template in &templates {
            println!("\n[{}]", template.page_type);
            for block in &template.blocks {
                println!("  - {}: {:?}", block.heading, block.source);
            }
        }
        return Ok(());
    }

    let pipeline = Pipeline::from_config(&config)?;
    let report = pipeline.run(&raw, &templates).await?;

    let out_dir = cli
        .out_dir
        .unwrap_or_else(|| PathBuf::from(&config.pipeline.output_dir));
    let written = write_pages(&report, &out_dir, cli.format)?;

    info!(
        "Run {} wrote {} file(s) to {}",
        report.run_id,
        written.len(),
        out_dir.display()
    );
    if report.competitor_is_placeholder {
        info!("Competitor synthesis fell back to the placeholder record");
    }
    Ok(())
}

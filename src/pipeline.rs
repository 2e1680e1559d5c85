//! End-to-end runner: one Analyst pass, then one page per template.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analyst::{AnalystAgent, RawProductRecord};
use crate::clients::{GeminiBackend, GenerationBackend, ResilientClient, RetryPolicy};
use crate::config::Config;
use crate::content::{LogicRegistry, PageTemplate};
use crate::error::{PipelineError, Result};
use crate::models::{PageOutput, PipelineState};
use crate::publisher::PageBuilder;
use crate::publisher::render::render_markdown;

pub const REPORT_FILE: &str = "run_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown format '{}' (expected json or markdown)", other)),
        }
    }
}

/// Summary of one run. Pages travel with it but are written to their own files.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub product_name: String,
    pub question_count: usize,
    pub competitor_name: String,
    pub competitor_is_placeholder: bool,
    pub page_types: Vec<String>,
    #[serde(skip)]
    pub pages: Vec<PageOutput>,
}

pub struct Pipeline {
    client: ResilientClient,
    registry: LogicRegistry,
    question_count: usize,
}

impl Pipeline {
    /// Gemini-backed pipeline; fails without an API key
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = GeminiBackend::from_config(config)?;
        info!("Using generation model {}", backend.model());
        Ok(Self::with_backend(Arc::new(backend), config))
    }

    pub fn with_backend(backend: Arc<dyn GenerationBackend>, config: &Config) -> Self {
        Self::new(
            ResilientClient::new(backend, RetryPolicy::from(&config.retry)),
            LogicRegistry::default(),
            config.pipeline.question_count,
        )
    }

    pub fn new(client: ResilientClient, registry: LogicRegistry, question_count: usize) -> Self {
        Self {
            client,
            registry,
            question_count,
        }
    }

    pub fn registry(&self) -> &LogicRegistry {
        &self.registry
    }

    pub async fn analyze(&self, raw: &RawProductRecord) -> Result<PipelineState> {
        AnalystAgent::new(&self.client, self.question_count)
            .run(raw)
            .await
    }

    pub async fn run(&self, raw: &RawProductRecord, templates: &[PageTemplate]) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Starting run {} for {} page(s)", run_id, templates.len());

        let state = self.analyze(raw).await?;

        let builder = PageBuilder::new(&self.client, &self.registry);
        let mut pages = Vec::with_capacity(templates.len());
        for template in templates {
            pages.push(builder.build(&state, template).await?);
        }

        let finished_at = Utc::now();
        info!(
            "Run {} finished in {} ms",
            run_id,
            (finished_at - started_at).num_milliseconds()
        );

        Ok(RunReport {
            run_id,
            started_at,
            finished_at,
            product_name: state.product().name.clone(),
            question_count: state.questions().len(),
            competitor_name: state.competitor().name.clone(),
            competitor_is_placeholder: state.competitor().is_placeholder(),
            page_types: pages.iter().map(|p| p.page_type.clone()).collect(),
            pages,
        })
    }
}

/// Write every page plus `run_report.json` into `dir`, returning the paths written
pub fn write_pages(report: &RunReport, dir: &Path, format: OutputFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::Io {
        message: format!("{}: {}", dir.display(), e),
    })?;

    let mut written = Vec::with_capacity(report.pages.len() + 1);
    for page in &report.pages {
        let path = dir.join(format!("{}.{}", page.page_type, format.extension()));
        let body = match format {
            OutputFormat::Json => serde_json::to_string_pretty(page)?,
            OutputFormat::Markdown => render_markdown(page),
        };
        write_file(&path, &body)?;
        info!("Saved {}", path.display());
        written.push(path);
    }

    let report_path = dir.join(REPORT_FILE);
    write_file(&report_path, &serde_json::to_string_pretty(report)?)?;
    written.push(report_path);
    Ok(written)
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    std::fs::write(path, body).map_err(|e| PipelineError::Io {
        message: format!("{}: {}", path.display(), e),
    })
}

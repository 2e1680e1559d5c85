//! Page templates: ordered block descriptors, validated on load.

use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::content::logic::{LogicBlockId, LogicRegistry};
use crate::error::{PipelineError, Result};
use crate::models::QuestionCategory;

pub const DEFAULT_HEADING: &str = "Section";

const SOURCE_LOGIC: &str = "logic_block";
const SOURCE_QUESTIONS: &str = "subset_questions";

/// Block descriptor as written in a template file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub page_type: String,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

/// Where a section's content comes from
#[derive(Debug, Clone, PartialEq)]
pub enum BlockSource {
    Logic(LogicBlockId),
    SubsetQuestions(QuestionCategory),
    Freeform(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBlock {
    pub heading: String,
    pub source: BlockSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTemplate {
    pub page_type: String,
    pub blocks: Vec<TemplateBlock>,
}

impl BlockSpec {
    fn resolve(&self, index: usize, registry: &LogicRegistry) -> Result<TemplateBlock> {
        let heading = self
            .section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_HEADING)
            .to_string();
        let at = |msg: String| PipelineError::template(format!("block {} ('{}'): {}", index, heading, msg));

        let stray = |keys: &[(&str, bool)]| -> Result<()> {
            match keys.iter().find(|(_, present)| *present) {
                Some((key, _)) => Err(at(format!("conflicting content key '{}'", key))),
                None => Ok(()),
            }
        };

        let source = match self.source.as_deref().map(str::trim) {
            Some(SOURCE_LOGIC) => {
                stray(&[
                    ("filter", self.filter.is_some()),
                    ("instruction", self.instruction.is_some()),
                ])?;
                let name = self
                    .function
                    .as_deref()
                    .ok_or_else(|| at("logic_block needs a 'function'".into()))?;
                let id: LogicBlockId = name.parse().map_err(|e: PipelineError| at(e.to_string()))?;
                if !registry.contains(id) {
                    return Err(at(format!("logic block '{}' is not registered", id)));
                }
                BlockSource::Logic(id)
            }
            Some(SOURCE_QUESTIONS) => {
                stray(&[
                    ("function", self.function.is_some()),
                    ("instruction", self.instruction.is_some()),
                ])?;
                let filter = self
                    .filter
                    .as_deref()
                    .ok_or_else(|| at("subset_questions needs a 'filter'".into()))?;
                BlockSource::SubsetQuestions(filter.parse().map_err(at)?)
            }
            Some(other) => return Err(at(format!("unknown source '{}'", other))),
            None => {
                stray(&[
                    ("function", self.function.is_some()),
                    ("filter", self.filter.is_some()),
                ])?;
                match self.instruction.as_deref().map(str::trim) {
                    Some(instruction) if !instruction.is_empty() => {
                        BlockSource::Freeform(instruction.to_string())
                    }
                    _ => return Err(at("block has no content source".into())),
                }
            }
        };

        Ok(TemplateBlock { heading, source })
    }
}

impl TemplateSpec {
    pub fn resolve(&self, registry: &LogicRegistry) -> Result<PageTemplate> {
        let page_type = self.page_type.trim();
        if page_type.is_empty() {
            return Err(PipelineError::template("template has an empty page_type"));
        }
        let blocks = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| b.resolve(i, registry))
            .collect::<Result<Vec<_>>>()?;
        Ok(PageTemplate {
            page_type: page_type.to_string(),
            blocks,
        })
    }
}

impl PageTemplate {
    /// Parse a `.toml` or `.json` template file and check it against `registry`
    pub fn load(path: &Path, registry: &LogicRegistry) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        let spec: TemplateSpec = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                PipelineError::template(format!("{}: {}", path.display(), e))
            })?,
            _ => toml::from_str(&content).map_err(|e| {
                PipelineError::template(format!("{}: {}", path.display(), e))
            })?,
        };
        spec.resolve(registry)
    }

    pub fn builtin(page_type: &str, registry: &LogicRegistry) -> Result<Self> {
        BUILTIN_TEMPLATES
            .iter()
            .find(|t| t.page_type == page_type)
            .ok_or_else(|| {
                PipelineError::template(format!(
                    "no built-in template '{}'. Available: {}",
                    page_type,
                    builtin_names().join(", ")
                ))
            })?
            .resolve(registry)
    }
}

pub fn builtin_names() -> Vec<&'static str> {
    vec!["faq", "product_page", "comparison_page"]
}

fn logic(section: &str, function: LogicBlockId) -> BlockSpec {
    BlockSpec {
        section: Some(section.into()),
        source: Some(SOURCE_LOGIC.into()),
        function: Some(function.as_str().into()),
        ..Default::default()
    }
}

fn subset(section: &str, category: QuestionCategory) -> BlockSpec {
    BlockSpec {
        section: Some(section.into()),
        source: Some(SOURCE_QUESTIONS.into()),
        filter: Some(category.as_str().into()),
        ..Default::default()
    }
}

fn freeform(section: &str, instruction: &str) -> BlockSpec {
    BlockSpec {
        section: Some(section.into()),
        instruction: Some(instruction.into()),
        ..Default::default()
    }
}

static BUILTIN_TEMPLATES: Lazy<Vec<TemplateSpec>> = Lazy::new(|| {
    vec![
        TemplateSpec {
            page_type: "faq".into(),
            blocks: vec![
                freeform(
                    "Introduction",
                    "Write a two-sentence welcome to the FAQ page for this product.",
                ),
                subset("General Information", QuestionCategory::Informational),
                subset("Usage & Application", QuestionCategory::Usage),
                subset("Safety & Side Effects", QuestionCategory::Safety),
                subset("Purchase & Pricing", QuestionCategory::Purchase),
            ],
        },
        TemplateSpec {
            page_type: "product_page".into(),
            blocks: vec![
                freeform(
                    "Hero Description",
                    "Write a punchy hero paragraph (max 60 words) that highlights the product's main promise.",
                ),
                logic("Key Benefits", LogicBlockId::GenerateBenefitsBlock),
                logic("Ingredients", LogicBlockId::GenerateIngredientsBlock),
                logic("How to Use", LogicBlockId::GenerateUsageBlock),
                logic("Safety Information", LogicBlockId::GenerateSafetyBlock),
                logic("Pricing", LogicBlockId::GeneratePriceBlock),
            ],
        },
        TemplateSpec {
            page_type: "comparison_page".into(),
            blocks: vec![
                freeform(
                    "Overview",
                    "Introduce a side-by-side comparison of this product against a competing serum.",
                ),
                logic("Side-by-Side Comparison", LogicBlockId::GenerateComparisonBlock),
                subset("Common Comparison Questions", QuestionCategory::Comparison),
                freeform(
                    "Verdict",
                    "Summarize who should choose this product and why, in under 80 words.",
                ),
            ],
        },
    ]
});

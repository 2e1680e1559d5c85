//! Publisher stage: walks a template block by block and assembles the page.

pub mod render;

use tracing::{info, warn};

use crate::clients::ResilientClient;
use crate::clients::resilient::TEXT_FALLBACK;
use crate::content::{BlockSource, LogicRegistry, PageTemplate, TemplateBlock};
use crate::error::{PipelineError, Result};
use crate::models::{
    PageOutput, PageSection, PipelineState, ProductData, QuestionCategory, SectionContent,
    UserQuestion,
};

const SUPPORT_DIRECTIVE: &str = "You are a helpful customer support agent.";
const COPYWRITER_DIRECTIVE: &str = "You are an expert marketing copywriter.";

pub struct PageBuilder<'a> {
    client: &'a ResilientClient,
    registry: &'a LogicRegistry,
}

impl<'a> PageBuilder<'a> {
    pub fn new(client: &'a ResilientClient, registry: &'a LogicRegistry) -> Self {
        Self { client, registry }
    }

    /// One section per block, in template order.
    ///
    /// A failed call degrades its own section; only retry exhaustion aborts.
    pub async fn build(&self, state: &PipelineState, template: &PageTemplate) -> Result<PageOutput> {
        info!(
            "[Publisher] Building '{}' page ({} blocks)",
            template.page_type,
            template.blocks.len()
        );

        let mut sections = Vec::with_capacity(template.blocks.len());
        for block in &template.blocks {
            let content = self.render_block(state, block).await?;
            sections.push(PageSection {
                heading: block.heading.clone(),
                content,
            });
        }

        let product = state.product();
        Ok(PageOutput {
            page_type: template.page_type.clone(),
            meta_title: meta_title(product, &template.page_type),
            meta_description: meta_description(product, &template.page_type),
            meta_tags: meta_tags(product, &template.page_type),
            sections,
        })
    }

    async fn render_block(
        &self,
        state: &PipelineState,
        block: &TemplateBlock,
    ) -> Result<SectionContent> {
        match &block.source {
            BlockSource::Logic(id) => {
                let Some(f) = self.registry.get(*id) else {
                    // templates are checked on load, so this is a registry swap
                    warn!("Logic block '{}' missing from registry", id);
                    return Ok(SectionContent::Prose(TEXT_FALLBACK.to_string()));
                };
                Ok(SectionContent::Prose(
                    f.call(state.product(), Some(state.competitor())),
                ))
            }
            BlockSource::SubsetQuestions(category) => {
                let answered = self.answer_questions(state, *category).await?;
                Ok(SectionContent::Questions(answered))
            }
            BlockSource::Freeform(instruction) => {
                let text = self
                    .write_freeform(state.product(), &block.heading, instruction)
                    .await?;
                Ok(SectionContent::Prose(text))
            }
        }
    }

    async fn answer_questions(
        &self,
        state: &PipelineState,
        category: QuestionCategory,
    ) -> Result<Vec<UserQuestion>> {
        let product_name = &state.product().name;
        let mut answered = Vec::new();
        for question in state.questions_in(category) {
            let prompt = answer_prompt(product_name, &question.question_text);
            let answer = self
                .client
                .invoke(SUPPORT_DIRECTIVE, &prompt, false)
                .await?;
            answered.push(question.answered(answer.trim()));
        }
        if answered.is_empty() {
            warn!("No {} questions available for section", category);
        }
        Ok(answered)
    }

    async fn write_freeform(
        &self,
        product: &ProductData,
        heading: &str,
        instruction: &str,
    ) -> Result<String> {
        let context = serde_json::to_string_pretty(product).map_err(PipelineError::from)?;
        let prompt = format!(
            "Product context (JSON):\n{}\n\n\
             Write the body text for the page section \"{}\".\n\
             Instruction: {}\n\
             Return only the section body. Light markdown (bold, lists) is allowed.",
            context, heading, instruction
        );
        self.client.invoke(COPYWRITER_DIRECTIVE, &prompt, false).await
    }
}

pub fn answer_prompt(product_name: &str, question: &str) -> String {
    format!(
        "Answer this question concisely for the product '{}': {}",
        product_name, question
    )
}

const ACRONYMS: &[&str] = &["faq", "qa", "spf", "diy"];

/// `product_page` → `Product Page`, `faq` → `FAQ`
pub fn page_label(page_type: &str) -> String {
    page_type
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            if ACRONYMS.iter().any(|a| a.eq_ignore_ascii_case(w)) {
                return w.to_uppercase();
            }
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn meta_title(product: &ProductData, page_type: &str) -> String {
    format!("{} | {}", product.name, page_label(page_type))
}

fn meta_description(product: &ProductData, page_type: &str) -> String {
    let label = page_label(page_type);
    match product.benefits.first() {
        Some(benefit) => format!(
            "{} for {}: {}. Read the full {} before you buy.",
            label,
            product.name,
            benefit.to_lowercase(),
            label.to_lowercase()
        ),
        None => format!("{} for {}.", label, product.name),
    }
}

fn meta_tags(product: &ProductData, page_type: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let candidates = std::iter::once(product.name.clone())
        .chain(std::iter::once(page_label(page_type)))
        .chain(product.skin_type.iter().map(|s| format!("{} skin", s)))
        .chain(product.ingredients.iter().cloned());
    for tag in candidates {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

//! Categorized user questions synthesized for a product.

use serde::Deserialize;
use tracing::{info, warn};

use crate::clients::ResilientClient;
use crate::error::Result;
use crate::models::{ProductData, QuestionCategory, UserQuestion};
use crate::parser;

const DIRECTIVE: &str = "You are a data generation assistant. Output valid JSON only.";

#[derive(Debug, Deserialize)]
struct QuestionBatch {
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    category: String,
    question_text: String,
}

pub struct QuestionGenerator<'a> {
    client: &'a ResilientClient,
    target_count: usize,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(client: &'a ResilientClient, target_count: usize) -> Self {
        Self {
            client,
            target_count,
        }
    }

    fn prompt(&self, product: &ProductData) -> String {
        format!(
            "Generate exactly {count} user questions for this product: {name}.\n\
             Categories: Informational, Safety, Usage, Purchase, Comparison.\n\
             Spread the questions across all five categories.\n\n\
             Output Structure (JSON):\n\
             {{ \"questions\": [ {{ \"category\": \"...\", \"question_text\": \"...\" }} ] }}",
            count = self.target_count,
            name = product.name
        )
    }

    /// Empty on a malformed response; fails only when retries run out
    pub async fn generate(&self, product: &ProductData) -> Result<Vec<UserQuestion>> {
        let response = self
            .client
            .invoke(DIRECTIVE, &self.prompt(product), true)
            .await?;

        let batch: Option<QuestionBatch> = parser::parse_or_else(&response, "Questions", || None);
        let Some(batch) = batch else {
            return Ok(Vec::new());
        };

        let questions = validate(batch.questions, self.target_count);
        info!("Generated {} questions", questions.len());
        Ok(questions)
    }
}

/// Drop entries outside the category set or without text, cap at `limit`
fn validate(raw: Vec<RawQuestion>, limit: usize) -> Vec<UserQuestion> {
    let received = raw.len();
    let mut out: Vec<UserQuestion> = raw
        .into_iter()
        .filter_map(|q| {
            let text = q.question_text.trim();
            if text.is_empty() {
                warn!("Dropping question with empty text");
                return None;
            }
            match q.category.parse::<QuestionCategory>() {
                Ok(category) => Some(UserQuestion::new(category, text)),
                Err(e) => {
                    warn!("Dropping question: {}", e);
                    None
                }
            }
        })
        .collect();
    if out.len() > limit {
        warn!("Received {} questions, keeping first {}", received, limit);
        out.truncate(limit);
    }
    out
}

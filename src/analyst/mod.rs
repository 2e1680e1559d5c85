//! Analyst stage: normalize the raw record, then enrich it with generated
//! questions and a synthesized competitor.

pub mod competitor;
pub mod normalizer;
pub mod questions;

use tracing::info;

use crate::clients::ResilientClient;
use crate::error::Result;
use crate::models::PipelineState;

pub use competitor::CompetitorSynthesizer;
pub use normalizer::{RawProductRecord, normalize};
pub use questions::QuestionGenerator;

pub struct AnalystAgent<'a> {
    client: &'a ResilientClient,
    question_count: usize,
}

impl<'a> AnalystAgent<'a> {
    pub fn new(client: &'a ResilientClient, question_count: usize) -> Self {
        Self {
            client,
            question_count,
        }
    }

    pub async fn run(&self, raw: &RawProductRecord) -> Result<PipelineState> {
        info!("[Analyst] Ingesting and enriching data");
        let product = normalize(raw)?;

        info!("[Analyst] Generating questions");
        let questions = QuestionGenerator::new(self.client, self.question_count)
            .generate(&product)
            .await?;

        info!("[Analyst] Creating fictional competitor");
        let competitor = CompetitorSynthesizer::new(self.client)
            .synthesize(&product)
            .await?;

        Ok(PipelineState::new(product, questions, competitor))
    }
}

// End-to-end question answering: retrieve -> compose -> generate
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::errors::Result;
use crate::models::Generator;
use crate::rag::context::PromptComposer;
use crate::rag::retrieval::{RetrievedReview, Retriever};

/// Answer plus the evidence it was conditioned on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub question: String,
    pub answer: String,
    /// Reviews returned by retrieval, nearest first
    pub reviews: Vec<RetrievedReview>,
    /// Reviews dropped from the prompt by the length budget
    pub dropped_reviews: usize,
    pub retrieval_ms: f64,
    pub generation_ms: f64,
}

impl RagResponse {
    pub fn total_ms(&self) -> f64 {
        self.retrieval_ms + self.generation_ms
    }
}

pub struct RagPipeline {
    retriever: Retriever,
    composer: PromptComposer,
    generator: Arc<dyn Generator>,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, composer: PromptComposer, generator: Arc<dyn Generator>) -> Self {
        Self {
            retriever,
            composer,
            generator,
        }
    }

    /// Retrieval only, with the configured `k`
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedReview>> {
        self.retriever.retrieve(question).await
    }

    /// Answer with the configured `k`
    pub async fn answer(&self, question: &str) -> Result<RagResponse> {
        self.answer_k(question, self.retriever.top_k()).await
    }

    pub async fn answer_k(&self, question: &str, k: usize) -> Result<RagResponse> {
        let start = Instant::now();
        let reviews = self.retriever.retrieve_k(question, k).await?;
        let retrieval_ms = start.elapsed().as_secs_f64() * 1000.0;

        let prompt = self.composer.compose(&reviews, question);
        debug!(
            prompt_chars = prompt.text.len(),
            included = prompt.included,
            dropped = prompt.dropped,
            "prompt composed"
        );

        let start = Instant::now();
        let answer = self.generator.generate(&prompt.text).await?;
        let generation_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(retrieval_ms, generation_ms, "answer generated");

        Ok(RagResponse {
            question: question.to_string(),
            answer,
            reviews,
            dropped_reviews: prompt.dropped,
            retrieval_ms,
            generation_ms,
        })
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    pub fn generator_model(&self) -> &str {
        self.generator.model_id()
    }
}

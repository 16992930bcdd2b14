//! Latency benchmark
//!
//! Runs a fixed query set through retrieval only, then end-to-end, and
//! derives generation time as the difference. Purely observational: errors
//! propagate and abort the run.

pub mod report;
pub mod stats;

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::errors::Result;
use crate::rag::RagPipeline;

pub use report::{BenchmarkReport, BenchmarkSettings};
pub use stats::LatencyStats;

/// Default query set
pub const DEFAULT_QUERIES: [&str; 5] = [
    "What do people say about the food quality?",
    "Are there any complaints about service?",
    "Which restaurant has the best atmosphere?",
    "Tell me about pricing",
    "What are the common positive reviews?",
];

/// Raw samples from one benchmark run, indexed by query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub queries: Vec<String>,
    pub retrieval_ms: Vec<f64>,
    pub end_to_end_ms: Vec<f64>,
    pub answer_chars: Vec<usize>,
}

impl BenchmarkRun {
    /// End-to-end minus retrieval, paired by query
    pub fn generation_ms(&self) -> Vec<f64> {
        self.end_to_end_ms
            .iter()
            .zip(&self.retrieval_ms)
            .map(|(e2e, retrieval)| e2e - retrieval)
            .collect()
    }

    pub fn retrieval_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(&self.retrieval_ms)
    }

    pub fn generation_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(&self.generation_ms())
    }

    pub fn end_to_end_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(&self.end_to_end_ms)
    }
}

/// Progress callback: (phase, query index starting at 1, total, milliseconds)
pub type ProgressFn<'a> = dyn FnMut(BenchPhase, usize, usize, f64) + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchPhase {
    Retrieval,
    EndToEnd,
}

pub struct BenchmarkHarness {
    queries: Vec<String>,
    warm_up: bool,
}

impl BenchmarkHarness {
    pub fn new(queries: Vec<String>) -> Self {
        Self {
            queries,
            warm_up: true,
        }
    }

    /// Skip the untimed first retrieval
    pub fn without_warm_up(mut self) -> Self {
        self.warm_up = false;
        self
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub async fn run(&self, pipeline: &RagPipeline) -> Result<BenchmarkRun> {
        self.run_with_progress(pipeline, &mut |_, _, _, _| {}).await
    }

    pub async fn run_with_progress(
        &self,
        pipeline: &RagPipeline,
        progress: &mut ProgressFn<'_>,
    ) -> Result<BenchmarkRun> {
        let total = self.queries.len();
        let mut run = BenchmarkRun {
            queries: self.queries.clone(),
            ..Default::default()
        };

        if self.warm_up {
            if let Some(first) = self.queries.first() {
                info!("warming up retrieval");
                pipeline.retrieve(first).await?;
            }
        }

        for (i, query) in self.queries.iter().enumerate() {
            let start = Instant::now();
            pipeline.retrieve(query).await?;
            let elapsed = start.elapsed().as_secs_f64() * 1000.0;
            run.retrieval_ms.push(elapsed);
            progress(BenchPhase::Retrieval, i + 1, total, elapsed);
        }

        for (i, query) in self.queries.iter().enumerate() {
            let start = Instant::now();
            let response = pipeline.answer(query).await?;
            let elapsed = start.elapsed().as_secs_f64() * 1000.0;
            run.end_to_end_ms.push(elapsed);
            run.answer_chars.push(response.answer.chars().count());
            progress(BenchPhase::EndToEnd, i + 1, total, elapsed);
        }

        Ok(run)
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new(DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect())
    }
}

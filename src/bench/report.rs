//! Markdown benchmark report

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::bench::stats::LatencyStats;
use crate::bench::BenchmarkRun;
use crate::corpus::CorpusSummary;
use crate::errors::Result;

/// What the benchmark ran against
#[derive(Debug, Clone)]
pub struct BenchmarkSettings {
    pub store_backend: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub top_k: usize,
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub settings: BenchmarkSettings,
    pub corpus: CorpusSummary,
    pub run: BenchmarkRun,
    pub generated_at: DateTime<Utc>,
}

impl BenchmarkReport {
    pub fn new(settings: BenchmarkSettings, corpus: CorpusSummary, run: BenchmarkRun) -> Self {
        Self {
            settings,
            corpus,
            run,
            generated_at: Utc::now(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = &self.settings;

        // Writing to a String cannot fail
        let _ = writeln!(out, "# Performance Benchmarks\n");
        let _ = writeln!(out, "_Generated {}_\n", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));

        let _ = writeln!(out, "## Test Configuration");
        let _ = writeln!(out, "- **Dataset Size**: {} restaurant reviews", self.corpus.total_reviews);
        let _ = writeln!(
            out,
            "- **Vector Store**: {} with Ollama embeddings ({})",
            s.store_backend, s.embedding_model
        );
        let _ = writeln!(out, "- **LLM**: {} (local via Ollama)", s.generation_model);
        let _ = writeln!(out, "- **Retrieval Count**: Top {} similar reviews", s.top_k);
        let _ = writeln!(out, "- **Test Queries**: {}\n", self.run.queries.len());

        let _ = writeln!(out, "## Performance Results\n");
        render_section(&mut out, "Retrieval Performance", self.run.retrieval_stats());
        render_section(&mut out, "LLM Generation", self.run.generation_stats());
        render_section(&mut out, "End-to-End Response Time", self.run.end_to_end_stats());

        let _ = writeln!(out, "## Dataset Information");
        let _ = writeln!(out, "- **Total Reviews**: {}", self.corpus.total_reviews);
        let _ = writeln!(
            out,
            "- **Avg Review Length**: {:.0} characters",
            self.corpus.avg_review_chars
        );
        let _ = writeln!(out, "- **Avg Rating**: {:.2}/5.0\n", self.corpus.avg_rating);

        let _ = writeln!(out, "## Test Queries");
        for (i, query) in self.run.queries.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, query);
        }

        out
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.render())?;
        Ok(())
    }
}

fn render_section(out: &mut String, title: &str, stats: Option<LatencyStats>) {
    let _ = writeln!(out, "### {}", title);
    match stats {
        Some(stats) => {
            let _ = writeln!(out, "| Statistic | Latency (ms) |");
            let _ = writeln!(out, "|---|---|");
            let _ = writeln!(out, "| Average | {:.2} |", stats.mean);
            let _ = writeln!(out, "| Median | {:.2} |", stats.median);
            let _ = writeln!(out, "| 95th Percentile | {:.2} |", stats.p95);
            let _ = writeln!(out, "| Min | {:.2} |", stats.min);
            let _ = writeln!(out, "| Max | {:.2} |\n", stats.max);
        }
        None => {
            let _ = writeln!(out, "No samples.\n");
        }
    }
}

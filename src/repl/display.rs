//! Terminal output for the question loop and one-shot queries

use colored::*;
use std::io::{self, Write};

use crate::rag::{RagResponse, RetrievedReview};

const RULE_WIDTH: usize = 50;

/// Formats everything the user sees
#[derive(Debug, Clone, Default)]
pub struct DisplayManager {
    /// Also list the reviews each answer was based on
    pub show_sources: bool,
}

impl DisplayManager {
    pub fn new(show_sources: bool) -> Self {
        Self { show_sources }
    }

    pub fn show_banner<W: Write>(&self, out: &mut W, model: &str, documents: u64) -> io::Result<()> {
        writeln!(out, "\n{}", "Restaurant Review RAG Agent".bold().cyan())?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH).cyan())?;
        writeln!(out, "Ask questions about restaurants based on reviews")?;
        writeln!(
            out,
            "{}",
            format!("Model: {} | Indexed reviews: {}", model, documents).dimmed()
        )?;
        writeln!(out, "Type '{}' to quit\n", "q".green())
    }

    pub fn show_rule<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))
    }

    pub fn show_searching<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n{}", "Searching reviews...".dimmed())
    }

    pub fn show_answer<W: Write>(&self, out: &mut W, response: &RagResponse, elapsed_ms: f64) -> io::Result<()> {
        writeln!(out, "\n{}", format!("Answer (generated in {:.0}ms):", elapsed_ms).green().bold())?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out, "{}", response.answer)?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(out, "\nBased on {} relevant reviews", response.reviews.len())?;

        if response.dropped_reviews > 0 {
            writeln!(
                out,
                "{}",
                format!(
                    "({} lower-ranked reviews left out to fit the prompt budget)",
                    response.dropped_reviews
                )
                .dimmed()
            )?;
        }

        if self.show_sources {
            self.show_reviews(out, &response.reviews)?;
        }
        Ok(())
    }

    /// Numbered list of retrieved reviews with their scores
    pub fn show_reviews<W: Write>(&self, out: &mut W, reviews: &[RetrievedReview]) -> io::Result<()> {
        for (i, review) in reviews.iter().enumerate() {
            writeln!(
                out,
                "\n{} {}",
                format!("Result {}:", i + 1).cyan(),
                format!("(score: {:.3}, rating: {}, date: {})", review.score, review.rating, review.date)
                    .dimmed()
            )?;
            writeln!(out, "  {}", preview(&review.content, 200))?;
        }
        Ok(())
    }

    pub fn show_error<W: Write>(&self, out: &mut W, error: &str) -> io::Result<()> {
        writeln!(out, "\n{} {}", "Error:".red().bold(), error.red())
    }

    pub fn show_notice<W: Write>(&self, out: &mut W, message: &str) -> io::Result<()> {
        writeln!(out, "{}", message.yellow())
    }

    pub fn show_goodbye<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n{}", "Goodbye!".green())
    }
}

/// First `max_chars` characters, with `...` if cut
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

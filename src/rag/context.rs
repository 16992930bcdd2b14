// Prompt composition for review-grounded answers
use serde::{Deserialize, Serialize};

use crate::errors::{RagError, Result};
use crate::rag::retrieval::RetrievedReview;

pub const REVIEWS_PLACEHOLDER: &str = "{reviews}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Default instruction template
pub const DEFAULT_TEMPLATE: &str = "You are an expert at answering questions about restaurants based on customer reviews.

Here are relevant customer reviews:
{reviews}

Question: {question}

Please provide a helpful, concise answer based on the reviews above.";

/// Character budget for the rendered reviews block
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 6000;

const ELLIPSIS: &str = "...";

/// Result of composing a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPrompt {
    pub text: String,
    /// Reviews rendered into the prompt, taken from the top of the ranking
    pub included: usize,
    /// Lowest-ranked reviews left out to fit the budget
    pub dropped: usize,
    /// Whether the last included review was cut short
    pub truncated: bool,
}

/// Fills the template with numbered reviews and the question
#[derive(Debug, Clone)]
pub struct PromptComposer {
    template: String,
    /// 0 disables the budget
    max_context_chars: usize,
}

impl PromptComposer {
    /// Template must contain both `{reviews}` and `{question}`
    pub fn new(template: impl Into<String>, max_context_chars: usize) -> Result<Self> {
        let template = template.into();
        for placeholder in [REVIEWS_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(RagError::ConfigError(format!(
                    "Prompt template is missing {}",
                    placeholder
                )));
            }
        }

        Ok(Self {
            template,
            max_context_chars,
        })
    }

    /// Render reviews as `Review {i} (Rating: {rating}): {content}`, blank-line separated
    pub fn format_reviews(reviews: &[RetrievedReview]) -> String {
        reviews
            .iter()
            .enumerate()
            .map(|(i, review)| format_review(i + 1, review.rating, &review.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Compose the full prompt; deterministic for identical input
    ///
    /// Over budget, the lowest-ranked reviews are dropped first. If the top
    /// review alone still does not fit, its content is cut on a character
    /// boundary and marked with `...`. A budget too small for even the
    /// review header leaves the reviews block empty.
    pub fn compose(&self, reviews: &[RetrievedReview], question: &str) -> ComposedPrompt {
        let mut included = reviews.len();
        let mut block = Self::format_reviews(reviews);
        let mut truncated = false;

        if self.max_context_chars > 0 {
            while included > 1 && block.chars().count() > self.max_context_chars {
                included -= 1;
                block = Self::format_reviews(&reviews[..included]);
            }

            if included == 1 && block.chars().count() > self.max_context_chars {
                let top = &reviews[0];
                let header_chars = format_review(1, top.rating, "").chars().count();
                let overhead = header_chars + ELLIPSIS.len();

                if overhead > self.max_context_chars {
                    // Not even the header fits
                    included = 0;
                    block = String::new();
                } else {
                    let available = self.max_context_chars - overhead;
                    let cut: String = top.content.chars().take(available).collect();
                    block = format_review(1, top.rating, &format!("{}{}", cut, ELLIPSIS));
                    truncated = true;
                }
            }
        }

        ComposedPrompt {
            text: fill_template(&self.template, &block, question),
            included,
            dropped: reviews.len() - included,
            truncated,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn max_context_chars(&self) -> usize {
        self.max_context_chars
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

fn format_review(index: usize, rating: f64, content: &str) -> String {
    format!("Review {} (Rating: {}): {}", index, rating, content)
}

/// Single pass so placeholder text inside reviews is never substituted
fn fill_template(template: &str, reviews: &str, question: &str) -> String {
    let mut out = String::with_capacity(template.len() + reviews.len() + question.len());
    let mut rest = template;

    loop {
        let next = [(REVIEWS_PLACEHOLDER, reviews), (QUESTION_PLACEHOLDER, question)]
            .into_iter()
            .filter_map(|(placeholder, value)| {
                rest.find(placeholder).map(|idx| (idx, placeholder, value))
            })
            .min_by_key(|(idx, _, _)| *idx);

        match next {
            Some((idx, placeholder, value)) => {
                out.push_str(&rest[..idx]);
                out.push_str(value);
                rest = &rest[idx + placeholder.len()..];
            }
            None => {
                out.push_str(rest);
                break;
            }
        }
    }

    out
}

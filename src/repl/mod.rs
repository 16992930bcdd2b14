//! Interactive question loop
//!
//! Single state: awaiting input. Each line is classified as a quit
//! sentinel, empty input (re-prompt), or a question that runs through the
//! pipeline. A failed question is reported and the loop carries on.

pub mod display;
pub mod input;

use anyhow::Result;
use std::io::Write;
use std::time::Instant;
use tracing::warn;

pub use crate::repl::display::DisplayManager;
pub use crate::repl::input::{BufReadSource, InputHandler, LineSource, ReadOutcome};
use crate::rag::RagPipeline;

pub const PROMPT: &str = "Your question: ";

/// Words that end the session, compared case-insensitively
pub const QUIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

/// What to do with one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Empty,
    Question(String),
}

pub fn classify_input(line: &str) -> InputAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputAction::Empty;
    }
    if QUIT_WORDS.iter().any(|w| trimmed.eq_ignore_ascii_case(w)) {
        return InputAction::Quit;
    }
    InputAction::Question(trimmed.to_string())
}

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub failed: usize,
}

/// REPL session coordinator
pub struct ReplSession<S: LineSource> {
    source: S,
    display: DisplayManager,
}

impl<S: LineSource> ReplSession<S> {
    pub fn new(source: S, display: DisplayManager) -> Self {
        Self { source, display }
    }

    /// Run until a quit word or end of input
    pub async fn run<W: Write>(&mut self, pipeline: &RagPipeline, out: &mut W) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        loop {
            self.display.show_rule(out)?;
            out.flush()?;

            let line = match self.source.read_line(PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => {
                    self.display.show_goodbye(out)?;
                    break;
                }
            };

            match classify_input(&line) {
                InputAction::Quit => {
                    self.display.show_goodbye(out)?;
                    break;
                }
                InputAction::Empty => {
                    self.display.show_notice(out, "Please enter a question")?;
                }
                InputAction::Question(question) => {
                    self.display.show_searching(out)?;
                    let start = Instant::now();

                    match pipeline.answer(&question).await {
                        Ok(response) => {
                            let elapsed = start.elapsed().as_secs_f64() * 1000.0;
                            self.display.show_answer(out, &response, elapsed)?;
                            summary.answered += 1;
                        }
                        Err(err) => {
                            warn!(error = %err, "question failed");
                            self.display.show_error(out, &err.to_string())?;
                            summary.failed += 1;
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

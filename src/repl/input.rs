//! Line input for the question loop
//!
//! [`InputHandler`] wraps rustyline for interactive terminals and keeps a
//! history file. [`BufReadSource`] reads from any `BufRead`, which covers
//! piped stdin and scripted tests.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::io::BufRead;
use std::path::PathBuf;

/// One read attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C; the loop re-prompts
    Interrupted,
    /// Ctrl-D or end of piped input
    Eof,
}

/// Source of user questions
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Input handler managing readline interface and command history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(InputHandler {
            editor: DefaultEditor::new()?,
            history_path: None,
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
        })
    }

    /// `~/.reviewbuddy/history`
    pub fn default_history_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".reviewbuddy").join("history"))
    }

    /// Save history to disk; called on graceful shutdown
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}

impl LineSource for InputHandler {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    let _ = self.editor.add_history_entry(trimmed);
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }
}

/// Reads questions line by line from a buffered reader
pub struct BufReadSource<R> {
    reader: R,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
        Ok(ReadOutcome::Line(line))
    }
}

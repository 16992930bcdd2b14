//! Command-line argument parsing for reviewbuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// reviewbuddy - Ask questions about restaurants, answered from their reviews
#[derive(Parser, Debug)]
#[command(name = "reviewbuddy")]
#[command(version)]
#[command(about = "Answer questions about restaurants from a local review corpus", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (warnings), -v (info), -vv (debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Review dataset CSV (overrides index.dataset_path)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Index directory (overrides index.store_path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Subcommand; interactive chat when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive question loop
    Chat,

    /// Build the index, or reopen it if it is current
    Index {
        /// Discard the existing index and re-embed everything
        #[arg(long)]
        rebuild: bool,
    },

    /// Answer a single question and exit
    Query {
        /// The question to ask
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Number of reviews to retrieve
        #[arg(short, long)]
        k: Option<usize>,

        /// Print the retrieved reviews without calling the LLM
        #[arg(long)]
        retrieve_only: bool,
    },

    /// Measure retrieval and generation latency
    Bench {
        /// Where to write the markdown report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that Ollama is running and the models are installed
    Doctor,

    /// Display the effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        }
    }

    /// The subcommand to run, defaulting to chat
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }

    /// Layer path flags over a loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dataset) = &self.dataset {
            config.index.dataset_path = dataset.clone();
        }
        if let Some(store) = &self.store {
            config.index.store_path = store.clone();
        }
    }
}

impl Verbosity {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub fn log_directive(&self) -> &'static str {
        match self {
            Verbosity::Normal => "reviewbuddy=warn",
            Verbosity::Verbose => "reviewbuddy=info",
            Verbosity::VeryVerbose => "reviewbuddy=debug",
        }
    }

    /// Progress bars are hidden once log lines start interleaving
    pub fn show_progress(&self) -> bool {
        matches!(self, Verbosity::Normal)
    }
}

//! reviewbuddy - Restaurant review question answering
//!
//! Retrieval-augmented generation over a CSV of restaurant reviews, backed
//! by local Ollama models.
//!
//! # Architecture
//!
//! - **Corpus + Indexer**: CSV rows embedded once into a vector store
//! - **RAG**: top-k retrieval, budgeted prompt composition, generation
//! - **Interface**: interactive loop, one-shot query, latency benchmark

pub mod errors;
pub mod config;
pub mod corpus;
pub mod models;
pub mod memory;

// Re-export commonly used types
pub use errors::{RagError, Result};

pub mod rag;
pub mod app;
pub use app::AppContext;

pub mod repl;
pub mod bench;
pub mod bootstrap;
pub mod cli;

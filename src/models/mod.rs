//! Ollama-backed model access
//!
//! - [`client`]: raw HTTP calls to the Ollama API
//! - [`embedding`]: the [`Embedder`] seam used for indexing and retrieval
//! - [`generation`]: the [`Generator`] seam used to answer questions

pub mod client;
pub mod embedding;
pub mod generation;

pub use client::OllamaClient;
pub use embedding::{Embedder, OllamaEmbedder};
pub use generation::{Generator, OllamaGenerator};

// Retrieval-augmented answering over the review index
//
// Components:
// - Retriever: similarity search for a question
// - PromptComposer: numbered reviews + question into one template
// - RagPipeline: retrieve -> compose -> generate

pub mod context;
pub mod pipeline;
pub mod retrieval;

pub use context::{ComposedPrompt, PromptComposer};
pub use pipeline::{RagPipeline, RagResponse};
pub use retrieval::{RetrievedReview, Retriever};

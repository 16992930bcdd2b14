pub mod engine;

pub use engine::{RetrievedReview, Retriever, DEFAULT_TOP_K};

//! RAG Pipeline: grounded answers over a single résumé.
//!
//! chunk → embed into an ephemeral index → retrieve top 3 → one completion.
//! Every stage failure surfaces as `RagError`; nothing here degrades silently.

pub mod chunker;
pub mod index;
pub mod pipeline;
pub mod prompts;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm_client::LlmError;

pub use pipeline::{BatchAnswer, PromptContext, RagPipeline};

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Invalid chunking parameters: {0}")]
    InvalidChunking(String),

    #[error("Document has no text to index")]
    EmptyDocument,

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Answer generation failed: {0}")]
    Generation(#[from] LlmError),
}

//! Embedding Client: turns text into fixed-length vectors and compares them.
//!
//! Two call families share one provider:
//! - `generate` / `generate_batch` degrade: a provider failure is logged and the
//!   all-zero sentinel comes back, so scoring continues without a semantic signal.
//! - `try_generate` / `try_generate_batch` are strict and surface the failure.
//!   Answer generation uses these; a fabricated grounding is worse than an error.

pub mod huggingface;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Output dimensionality of sentence-transformers/all-MiniLM-L6-v2.
pub const EMBEDDING_DIMENSIONS: usize = 384;

/// Provider input ceiling, in characters, applied after whitespace normalization.
pub const MAX_INPUT_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Text cannot be empty for embedding generation")]
    EmptyInput,

    #[error("Vectors must have same dimensions ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Embedding provider error: {0}")]
    Provider(String),
}

/// Raw embedding capability. Implementations talk to a remote model and report
/// failures as `EmbeddingError::Provider`.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Provider("No embedding generated".to_string()))
    }
}

#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Embeds one text. Provider failures degrade to the zero vector.
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self.try_generate(text).await {
            Ok(embedding) => Ok(embedding),
            Err(EmbeddingError::EmptyInput) => Err(EmbeddingError::EmptyInput),
            Err(e) => {
                warn!("Embedding generation degraded to zero vector: {e}");
                Ok(zero_vector())
            }
        }
    }

    /// Embeds several texts. Provider failures degrade to one zero vector per input.
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match self.try_generate_batch(texts).await {
            Ok(embeddings) => Ok(embeddings),
            Err(EmbeddingError::EmptyInput) => Err(EmbeddingError::EmptyInput),
            Err(e) => {
                warn!(
                    "Batch embedding of {} texts degraded to zero vectors: {e}",
                    texts.len()
                );
                Ok(texts.iter().map(|_| zero_vector()).collect())
            }
        }
    }

    pub async fn try_generate(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let cleaned = prepare_text(text).ok_or(EmbeddingError::EmptyInput)?;
        let embedding = self.provider.embed(&cleaned).await?;
        check_dimensions(&embedding)?;
        debug!("Generated embedding: {} dimensions", embedding.len());
        Ok(embedding)
    }

    pub async fn try_generate_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let cleaned = texts
            .iter()
            .map(|t| prepare_text(t).ok_or(EmbeddingError::EmptyInput))
            .collect::<Result<Vec<_>, _>>()?;

        let embeddings = self.provider.embed_batch(&cleaned).await?;
        if embeddings.len() != cleaned.len() {
            return Err(EmbeddingError::Provider(format!(
                "Expected {} embeddings, provider returned {}",
                cleaned.len(),
                embeddings.len()
            )));
        }
        for embedding in &embeddings {
            check_dimensions(embedding)?;
        }
        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }
}

/// Collapses whitespace runs, trims, and truncates to the provider ceiling.
/// Returns `None` when nothing is left to embed.
pub fn prepare_text(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(MAX_INPUT_CHARS).collect())
}

pub fn zero_vector() -> Vec<f32> {
    vec![0.0; EMBEDDING_DIMENSIONS]
}

/// True for the empty vector and for the all-zero "unavailable" sentinel.
pub fn is_unavailable(embedding: &[f32]) -> bool {
    embedding.iter().all(|v| *v == 0.0)
}

fn check_dimensions(embedding: &[f32]) -> Result<(), EmbeddingError> {
    if embedding.len() != EMBEDDING_DIMENSIONS {
        return Err(EmbeddingError::Provider(format!(
            "Expected {EMBEDDING_DIMENSIONS}-dimensional embedding, got {}",
            embedding.len()
        )));
    }
    Ok(())
}

/// Cosine similarity in [-1, 1]. Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut mag_a = 0.0_f64;
    let mut mag_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    if mag_a == 0.0 || mag_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (mag_a.sqrt() * mag_b.sqrt())).clamp(-1.0, 1.0) as f32)
}

//! Test doubles for the external providers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::embedding::{EmbeddingError, EmbeddingProvider, EMBEDDING_DIMENSIONS};
use crate::llm_client::{CompletionProvider, LlmError};

/// Deterministic bag-of-words embedding: each lowercase word bumps one bucket.
/// Texts sharing words get positive cosine similarity.
pub struct HashEmbeddings;

pub fn hash_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0_f32; EMBEDDING_DIMENSIONS];
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let bucket = word
            .bytes()
            .fold(7_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % EMBEDDING_DIMENSIONS;
        v[bucket] += 1.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| hash_embedding(t)).collect())
    }
}

/// Provider that fails every call.
pub struct FailingEmbeddings;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddings {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Provider("service unavailable".to_string()))
    }
}

/// Completion provider that replays queued replies, then repeats the fallback.
/// Records every prompt it receives.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: Result<String, String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    yields: usize,
}

impl ScriptedLlm {
    pub fn replying(text: &str) -> Self {
        Self::with_fallback(Ok(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_fallback(Err("upstream timeout".to_string()))
    }

    fn with_fallback(fallback: Result<String, String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            yields: 0,
        }
    }

    /// Yields to the scheduler `times` times before each reply, so concurrent
    /// callers interleave around the completion.
    pub fn yielding(mut self, times: usize) -> Self {
        self.yields = times;
        self
    }

    pub fn then(self, reply: Result<&str, &str>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(reply.map(String::from).map_err(String::from));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.map_err(|message| LlmError::Api {
            status: 503,
            message,
        })
    }
}

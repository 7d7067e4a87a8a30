use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::embedding::EmbeddingClient;
use crate::llm_client::CompletionProvider;
use crate::memory::NO_HISTORY;
use crate::models::resume::ResumeRow;
use crate::rag::chunker::{split_into_chunks, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::rag::index::EphemeralIndex;
use crate::rag::prompts::{build_answer_prompt, ANSWER_SYSTEM};
use crate::rag::RagError;

/// Chunks retrieved per question.
pub const TOP_K: usize = 3;

/// Candidate facts and history injected into the answer prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub conversation_history: String,
    pub candidate_name: String,
    pub total_years: f64,
    pub skills: String,
}

impl Default for PromptContext {
    fn default() -> Self {
        Self {
            conversation_history: NO_HISTORY.to_string(),
            candidate_name: "Unknown".to_string(),
            total_years: 0.0,
            skills: "Not specified".to_string(),
        }
    }
}

impl PromptContext {
    pub fn for_resume(resume: &ResumeRow, conversation_history: String) -> Self {
        let defaults = Self::default();
        let name = resume.candidate_name.trim();
        Self {
            conversation_history,
            candidate_name: if name.is_empty() {
                defaults.candidate_name
            } else {
                name.to_string()
            },
            total_years: resume.total_years_experience.max(0.0),
            skills: if resume.extracted_skills.is_empty() {
                defaults.skills
            } else {
                resume.extracted_skills.join(", ")
            },
        }
    }
}

/// One entry of a batch run. Exactly one of `answer` / `error` is set.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchAnswer {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct RagPipeline {
    embeddings: EmbeddingClient,
    llm: Arc<dyn CompletionProvider>,
}

impl RagPipeline {
    pub fn new(embeddings: EmbeddingClient, llm: Arc<dyn CompletionProvider>) -> Self {
        Self { embeddings, llm }
    }

    pub async fn answer(
        &self,
        resume_text: &str,
        question: &str,
        context: &PromptContext,
    ) -> Result<String, RagError> {
        let index = self.build_index(resume_text).await?;
        let answer = self.answer_with_index(&index, question, context).await?;
        info!("RAG answer generated from {} chunks", index.chunk_count());
        Ok(answer)
    }

    /// Builds the index once and answers every question against it concurrently.
    /// A failing question becomes an error entry; only index construction fails the batch.
    pub async fn batch_answer(
        &self,
        resume_text: &str,
        questions: &[String],
        context: &PromptContext,
    ) -> Result<Vec<BatchAnswer>, RagError> {
        let index = self.build_index(resume_text).await?;

        let tasks = questions.iter().map(|question| {
            let index = &index;
            async move {
                match self.answer_with_index(index, question, context).await {
                    Ok(answer) => BatchAnswer {
                        question: question.clone(),
                        answer: Some(answer),
                        error: None,
                    },
                    Err(e) => {
                        warn!("Batch question failed: {e}");
                        BatchAnswer {
                            question: question.clone(),
                            answer: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            }
        });

        let results = join_all(tasks).await;
        info!("Batch RAG completed for {} questions", results.len());
        Ok(results)
    }

    async fn build_index(&self, resume_text: &str) -> Result<EphemeralIndex, RagError> {
        if resume_text.trim().is_empty() {
            return Err(RagError::EmptyDocument);
        }
        let chunks = split_into_chunks(resume_text, DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)?;
        debug!("Split resume into {} chunks", chunks.len());
        EphemeralIndex::build(chunks, &self.embeddings).await
    }

    async fn answer_with_index(
        &self,
        index: &EphemeralIndex,
        question: &str,
        context: &PromptContext,
    ) -> Result<String, RagError> {
        let hits = index.similarity_search(question, TOP_K, &self.embeddings).await?;
        let retrieved = hits
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = build_answer_prompt(
            &retrieved,
            &context.conversation_history,
            &context.candidate_name,
            context.total_years,
            &context.skills,
            question,
        );
        Ok(self.llm.complete(&prompt, ANSWER_SYSTEM).await?)
    }
}

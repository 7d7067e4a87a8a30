//! Storage collaborator seam.
//!
//! Business logic talks to these traits only. `PgStore` is the production
//! implementation; tests use the in-memory store.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::conversation::{
    ChatMessage, ConversationListRow, ConversationRow, MemoryContext,
};
use crate::models::job::{JobRow, NewJob};
use crate::models::matching::{MatchQuery, MatchRow, MatchScores, MatchWithCandidate};
use crate::models::resume::{NewResume, ResumeRow};
use crate::models::Page;

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait TalentStore: Send + Sync {
    async fn insert_job(&self, job: NewJob) -> StoreResult<JobRow>;
    async fn list_jobs(&self) -> StoreResult<Vec<JobRow>>;
    async fn find_job(&self, id: Uuid) -> StoreResult<Option<JobRow>>;
    async fn update_job_skills(&self, id: Uuid, skills: &[String]) -> StoreResult<()>;

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<ResumeRow>;
    async fn find_resume(&self, id: Uuid) -> StoreResult<Option<ResumeRow>>;
    /// Every résumé, oldest first.
    async fn list_resumes(&self) -> StoreResult<Vec<ResumeRow>>;
    /// Newest first, with the total count.
    async fn list_resumes_page(&self, page: Page) -> StoreResult<(Vec<ResumeRow>, i64)>;
    async fn delete_resume(&self, id: Uuid) -> StoreResult<bool>;

    /// Insert-or-replace keyed by `(job_id, resume_id)`. Keeps the row id and
    /// `created_at` of an existing record; every scored field is overwritten.
    async fn upsert_match(
        &self,
        job_id: Uuid,
        resume_id: Uuid,
        scores: &MatchScores,
    ) -> StoreResult<MatchRow>;
    /// Matches for a job with `match_percentage >= min_match`, sorted descending
    /// with ties in insertion order, plus the filtered total.
    async fn query_matches(
        &self,
        job_id: Uuid,
        query: &MatchQuery,
    ) -> StoreResult<(Vec<MatchWithCandidate>, i64)>;
    async fn find_match(&self, id: Uuid) -> StoreResult<Option<MatchRow>>;
    async fn delete_match(&self, id: Uuid) -> StoreResult<bool>;
}

/// Derives the memory context from a conversation's complete message list.
pub type MemoryRebuild<'a> = dyn Fn(&[ChatMessage]) -> MemoryContext + Send + Sync + 'a;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn find_active_conversation(
        &self,
        resume_id: Uuid,
        user_id: &str,
    ) -> StoreResult<Option<ConversationRow>>;
    async fn insert_conversation(
        &self,
        resume_id: Uuid,
        user_id: &str,
        memory_context: &MemoryContext,
    ) -> StoreResult<ConversationRow>;
    async fn find_conversation(&self, id: Uuid) -> StoreResult<Option<ConversationRow>>;
    /// Replaces messages and memory context, bumping `updated_at`.
    async fn save_conversation(
        &self,
        id: Uuid,
        messages: &[ChatMessage],
        memory_context: &MemoryContext,
    ) -> StoreResult<ConversationRow>;
    /// Appends `exchange` to the stored messages while holding the row lock,
    /// then stores the memory `rebuild` derives from the full list. Concurrent
    /// appends to one conversation serialize. `None` if the row is gone.
    async fn append_exchange(
        &self,
        id: Uuid,
        exchange: &[ChatMessage],
        rebuild: &MemoryRebuild<'_>,
    ) -> StoreResult<Option<ConversationRow>>;
    /// Returns the deleted row, if any.
    async fn delete_conversation(&self, id: Uuid) -> StoreResult<Option<ConversationRow>>;
    /// Most recently updated first, with the total count.
    async fn list_conversations_for_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> StoreResult<(Vec<ConversationListRow>, i64)>;
}

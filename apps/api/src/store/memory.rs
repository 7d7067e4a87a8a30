//! In-memory store for tests. Mirrors the Postgres constraints that business
//! logic relies on: unique `(job_id, resume_id)` matches, conversation cascade on
//! résumé delete, and no foreign key from matches to résumés.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::conversation::{
    ChatMessage, ConversationListRow, ConversationRow, MemoryContext,
};
use crate::models::job::{JobRow, NewJob};
use crate::models::matching::{MatchQuery, MatchRow, MatchScores, MatchSort, MatchWithCandidate};
use crate::models::resume::{CandidateSummary, NewResume, ResumeRow};
use crate::models::Page;
use crate::store::{ConversationStore, MemoryRebuild, StoreResult, TalentStore};

#[derive(Default)]
struct Tables {
    jobs: Vec<JobRow>,
    resumes: Vec<ResumeRow>,
    matches: Vec<MatchRow>,
    conversations: Vec<ConversationRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_match_writes: Mutex<HashSet<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `upsert_match` for this résumé fail.
    pub fn fail_match_writes_for(&self, resume_id: Uuid) {
        self.failing_match_writes.lock().unwrap().insert(resume_id);
    }

    pub fn match_count(&self) -> usize {
        self.tables.lock().unwrap().matches.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.tables.lock().unwrap().conversations.len()
    }
}

fn paginate<T: Clone>(items: &[T], page: Page) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl TalentStore for MemoryStore {
    async fn insert_job(&self, job: NewJob) -> StoreResult<JobRow> {
        let row = job.into_row(Uuid::new_v4(), Utc::now());
        self.tables.lock().unwrap().jobs.push(row.clone());
        Ok(row)
    }

    async fn list_jobs(&self) -> StoreResult<Vec<JobRow>> {
        let mut jobs = self.tables.lock().unwrap().jobs.clone();
        jobs.reverse();
        Ok(jobs)
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<JobRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn update_job_skills(&self, id: Uuid, skills: &[String]) -> StoreResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(job) = tables.jobs.iter_mut().find(|j| j.id == id) {
            job.extracted_skills = skills.to_vec();
        }
        Ok(())
    }

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<ResumeRow> {
        let row = resume.into_row(Uuid::new_v4(), Utc::now());
        self.tables.lock().unwrap().resumes.push(row.clone());
        Ok(row)
    }

    async fn find_resume(&self, id: Uuid) -> StoreResult<Option<ResumeRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.resumes.iter().find(|r| r.id == id).cloned())
    }

    async fn list_resumes(&self) -> StoreResult<Vec<ResumeRow>> {
        Ok(self.tables.lock().unwrap().resumes.clone())
    }

    async fn list_resumes_page(&self, page: Page) -> StoreResult<(Vec<ResumeRow>, i64)> {
        let mut resumes = self.tables.lock().unwrap().resumes.clone();
        resumes.reverse();
        let total = resumes.len() as i64;
        Ok((paginate(&resumes, page), total))
    }

    async fn delete_resume(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.resumes.len();
        tables.resumes.retain(|r| r.id != id);
        tables.conversations.retain(|c| c.resume_id != id);
        Ok(tables.resumes.len() < before)
    }

    async fn upsert_match(
        &self,
        job_id: Uuid,
        resume_id: Uuid,
        scores: &MatchScores,
    ) -> StoreResult<MatchRow> {
        if self.failing_match_writes.lock().unwrap().contains(&resume_id) {
            return Err(sqlx::Error::Protocol("simulated write failure".to_string()));
        }

        let now = Utc::now();
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables
            .matches
            .iter_mut()
            .find(|m| m.job_id == job_id && m.resume_id == resume_id)
        {
            existing.match_percentage = scores.match_percentage;
            existing.matched_skills = scores.matched_skills.clone();
            existing.missing_skills = scores.missing_skills.clone();
            existing.semantic_score = scores.semantic_score;
            existing.experience_score = scores.experience_score;
            existing.rank_score = scores.rank_score;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = MatchRow {
            id: Uuid::new_v4(),
            job_id,
            resume_id,
            match_percentage: scores.match_percentage,
            matched_skills: scores.matched_skills.clone(),
            missing_skills: scores.missing_skills.clone(),
            semantic_score: scores.semantic_score,
            experience_score: scores.experience_score,
            rank_score: scores.rank_score,
            created_at: now,
            updated_at: now,
        };
        tables.matches.push(row.clone());
        Ok(row)
    }

    async fn query_matches(
        &self,
        job_id: Uuid,
        query: &MatchQuery,
    ) -> StoreResult<(Vec<MatchWithCandidate>, i64)> {
        let tables = self.tables.lock().unwrap();
        let mut matches: Vec<&MatchRow> = tables
            .matches
            .iter()
            .filter(|m| m.job_id == job_id && m.match_percentage >= query.min_match)
            .collect();

        // Stable sort keeps insertion order for ties.
        match query.sort_by {
            MatchSort::RankScore => {
                matches.sort_by(|a, b| b.rank_score.total_cmp(&a.rank_score))
            }
            MatchSort::MatchPercentage => {
                matches.sort_by(|a, b| b.match_percentage.total_cmp(&a.match_percentage))
            }
            MatchSort::CreatedAt => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let total = matches.len() as i64;
        let page: Vec<MatchWithCandidate> = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .map(|m| MatchWithCandidate {
                record: m.clone(),
                candidate: tables
                    .resumes
                    .iter()
                    .find(|r| r.id == m.resume_id)
                    .map(CandidateSummary::from),
            })
            .collect();
        Ok((page, total))
    }

    async fn find_match(&self, id: Uuid) -> StoreResult<Option<MatchRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.matches.iter().find(|m| m.id == id).cloned())
    }

    async fn delete_match(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.matches.len();
        tables.matches.retain(|m| m.id != id);
        Ok(tables.matches.len() < before)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find_active_conversation(
        &self,
        resume_id: Uuid,
        user_id: &str,
    ) -> StoreResult<Option<ConversationRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .conversations
            .iter()
            .find(|c| c.resume_id == resume_id && c.user_id == user_id && c.is_active)
            .cloned())
    }

    async fn insert_conversation(
        &self,
        resume_id: Uuid,
        user_id: &str,
        memory_context: &MemoryContext,
    ) -> StoreResult<ConversationRow> {
        let now = Utc::now();
        let row = ConversationRow {
            id: Uuid::new_v4(),
            resume_id,
            user_id: user_id.to_string(),
            messages: Json(Vec::new()),
            memory_context: Json(memory_context.clone()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().conversations.push(row.clone());
        Ok(row)
    }

    async fn find_conversation(&self, id: Uuid) -> StoreResult<Option<ConversationRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn save_conversation(
        &self,
        id: Uuid,
        messages: &[ChatMessage],
        memory_context: &MemoryContext,
    ) -> StoreResult<ConversationRow> {
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(sqlx::Error::RowNotFound)?;
        row.messages = Json(messages.to_vec());
        row.memory_context = Json(memory_context.clone());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn append_exchange(
        &self,
        id: Uuid,
        exchange: &[ChatMessage],
        rebuild: &MemoryRebuild<'_>,
    ) -> StoreResult<Option<ConversationRow>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.conversations.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        row.messages.0.extend_from_slice(exchange);
        row.memory_context = Json(rebuild(&row.messages.0));
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_conversation(&self, id: Uuid) -> StoreResult<Option<ConversationRow>> {
        let mut tables = self.tables.lock().unwrap();
        let position = tables.conversations.iter().position(|c| c.id == id);
        Ok(position.map(|i| tables.conversations.remove(i)))
    }

    async fn list_conversations_for_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> StoreResult<(Vec<ConversationListRow>, i64)> {
        let tables = self.tables.lock().unwrap();
        let mut conversations: Vec<&ConversationRow> = tables
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let total = conversations.len() as i64;
        let rows = conversations
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|c| {
                let resume = tables.resumes.iter().find(|r| r.id == c.resume_id);
                ConversationListRow {
                    conversation: c.clone(),
                    candidate_name: resume.map(|r| r.candidate_name.clone()),
                    candidate_email: resume.and_then(|r| r.email.clone()),
                }
            })
            .collect();
        Ok((rows, total))
    }
}

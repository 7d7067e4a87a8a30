//! Postgres implementation of the storage traits.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::conversation::{
    ChatMessage, ConversationListRow, ConversationRow, MemoryContext,
};
use crate::models::job::{JobRow, NewJob};
use crate::models::matching::{MatchQuery, MatchRow, MatchScores, MatchWithCandidate};
use crate::models::resume::{CandidateSummary, NewResume, ResumeRow};
use crate::models::Page;
use crate::skills::candidate_info::EducationEntry;
use crate::store::{ConversationStore, MemoryRebuild, StoreResult, TalentStore};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `matches` LEFT JOIN `resumes`. Candidate columns are NULL for orphaned matches.
#[derive(Debug, FromRow)]
struct MatchCandidateRow {
    #[sqlx(flatten)]
    record: MatchRow,
    candidate_id: Option<Uuid>,
    candidate_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    candidate_skills: Option<Vec<String>>,
    total_years_experience: Option<f64>,
    education: Option<Json<Vec<EducationEntry>>>,
}

impl From<MatchCandidateRow> for MatchWithCandidate {
    fn from(row: MatchCandidateRow) -> Self {
        let candidate = row.candidate_id.map(|id| CandidateSummary {
            id,
            candidate_name: row.candidate_name.unwrap_or_default(),
            email: row.email,
            phone: row.phone,
            extracted_skills: row.candidate_skills.unwrap_or_default(),
            total_years_experience: row.total_years_experience.unwrap_or(0.0),
            education: row.education.map(|e| e.0).unwrap_or_default(),
        });
        Self {
            record: row.record,
            candidate,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs, résumés, matches
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl TalentStore for PgStore {
    async fn insert_job(&self, job: NewJob) -> StoreResult<JobRow> {
        sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (id, job_title, job_description, extracted_skills, experience_level, company, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.job_title)
        .bind(&job.job_description)
        .bind(&job.extracted_skills)
        .bind(&job.experience_level)
        .bind(&job.company)
        .bind(&job.location)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_jobs(&self) -> StoreResult<Vec<JobRow>> {
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<JobRow>> {
        sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_job_skills(&self, id: Uuid, skills: &[String]) -> StoreResult<()> {
        sqlx::query("UPDATE jobs SET extracted_skills = $2 WHERE id = $1")
            .bind(id)
            .bind(skills)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_resume(&self, resume: NewResume) -> StoreResult<ResumeRow> {
        sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, file_name, candidate_name, email, phone, extracted_text, extracted_skills,
                 total_years_experience, experience_details, education, summary, embedding)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&resume.file_name)
        .bind(&resume.candidate_name)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.extracted_text)
        .bind(&resume.extracted_skills)
        .bind(resume.total_years_experience.max(0.0))
        .bind(&resume.experience_details)
        .bind(Json(&resume.education))
        .bind(&resume.summary)
        .bind(&resume.embedding)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_resume(&self, id: Uuid) -> StoreResult<Option<ResumeRow>> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_resumes(&self) -> StoreResult<Vec<ResumeRow>> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
    }

    async fn list_resumes_page(&self, page: Page) -> StoreResult<(Vec<ResumeRow>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
            .fetch_one(&self.pool)
            .await?;

        let resumes = sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((resumes, total))
    }

    async fn delete_resume(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_match(
        &self,
        job_id: Uuid,
        resume_id: Uuid,
        scores: &MatchScores,
    ) -> StoreResult<MatchRow> {
        sqlx::query_as::<_, MatchRow>(
            r#"
            INSERT INTO matches
                (id, job_id, resume_id, match_percentage, matched_skills, missing_skills,
                 semantic_score, experience_score, rank_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (job_id, resume_id) DO UPDATE SET
                match_percentage = EXCLUDED.match_percentage,
                matched_skills   = EXCLUDED.matched_skills,
                missing_skills   = EXCLUDED.missing_skills,
                semantic_score   = EXCLUDED.semantic_score,
                experience_score = EXCLUDED.experience_score,
                rank_score       = EXCLUDED.rank_score,
                updated_at       = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(resume_id)
        .bind(scores.match_percentage)
        .bind(&scores.matched_skills)
        .bind(&scores.missing_skills)
        .bind(scores.semantic_score)
        .bind(scores.experience_score)
        .bind(scores.rank_score)
        .fetch_one(&self.pool)
        .await
    }

    async fn query_matches(
        &self,
        job_id: Uuid,
        query: &MatchQuery,
    ) -> StoreResult<(Vec<MatchWithCandidate>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM matches WHERE job_id = $1 AND match_percentage >= $2",
        )
        .bind(job_id)
        .bind(query.min_match)
        .fetch_one(&self.pool)
        .await?;

        // Sort column comes from a closed enum, never from request text.
        let sql = format!(
            r#"
            SELECT m.*,
                   r.id                     AS candidate_id,
                   r.candidate_name,
                   r.email,
                   r.phone,
                   r.extracted_skills       AS candidate_skills,
                   r.total_years_experience,
                   r.education
            FROM matches m
            LEFT JOIN resumes r ON r.id = m.resume_id
            WHERE m.job_id = $1 AND m.match_percentage >= $2
            ORDER BY m.{} DESC, m.created_at, m.id
            LIMIT $3 OFFSET $4
            "#,
            query.sort_by.column()
        );

        let rows = sqlx::query_as::<_, MatchCandidateRow>(&sql)
            .bind(job_id)
            .bind(query.min_match)
            .bind(query.page.limit)
            .bind(query.page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(MatchWithCandidate::from).collect(), total))
    }

    async fn find_match(&self, id: Uuid) -> StoreResult<Option<MatchRow>> {
        sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_match(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Conversations
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ConversationStore for PgStore {
    async fn find_active_conversation(
        &self,
        resume_id: Uuid,
        user_id: &str,
    ) -> StoreResult<Option<ConversationRow>> {
        sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT * FROM conversations
            WHERE resume_id = $1 AND user_id = $2 AND is_active
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_conversation(
        &self,
        resume_id: Uuid,
        user_id: &str,
        memory_context: &MemoryContext,
    ) -> StoreResult<ConversationRow> {
        sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (id, resume_id, user_id, messages, memory_context, is_active)
            VALUES ($1, $2, $3, '[]', $4, TRUE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resume_id)
        .bind(user_id)
        .bind(Json(memory_context))
        .fetch_one(&self.pool)
        .await
    }

    async fn find_conversation(&self, id: Uuid) -> StoreResult<Option<ConversationRow>> {
        sqlx::query_as::<_, ConversationRow>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_conversation(
        &self,
        id: Uuid,
        messages: &[ChatMessage],
        memory_context: &MemoryContext,
    ) -> StoreResult<ConversationRow> {
        sqlx::query_as::<_, ConversationRow>(
            r#"
            UPDATE conversations
            SET messages = $2, memory_context = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(messages))
        .bind(Json(memory_context))
        .fetch_one(&self.pool)
        .await
    }

    async fn append_exchange(
        &self,
        id: Uuid,
        exchange: &[ChatMessage],
        rebuild: &MemoryRebuild<'_>,
    ) -> StoreResult<Option<ConversationRow>> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, ConversationRow>(
            "SELECT * FROM conversations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let mut messages = current.messages.0;
        messages.extend_from_slice(exchange);
        let memory_context = rebuild(&messages);

        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            UPDATE conversations
            SET messages = $2, memory_context = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&messages))
        .bind(Json(&memory_context))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete_conversation(&self, id: Uuid) -> StoreResult<Option<ConversationRow>> {
        sqlx::query_as::<_, ConversationRow>(
            "DELETE FROM conversations WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_conversations_for_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> StoreResult<(Vec<ConversationListRow>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ConversationListRow>(
            r#"
            SELECT c.*,
                   r.candidate_name,
                   r.email AS candidate_email
            FROM conversations c
            LEFT JOIN resumes r ON r.id = c.resume_id
            WHERE c.user_id = $1
            ORDER BY c.updated_at DESC, c.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}

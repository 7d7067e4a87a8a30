//! Matching & Ranking Engine.
//!
//! Scoring absorbs provider failures: a failed job embedding scores 0 semantically,
//! a failed skill extraction falls back to the keyword vocabulary. Only a missing
//! job or résumé at the start of an operation is surfaced.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingClient;
use crate::errors::AppError;
use crate::matching::scoring::{normalize_skills, score_candidate, ScoringContext};
use crate::models::job::JobRow;
use crate::models::matching::{MatchQuery, MatchRow, MatchWithCandidate};
use crate::models::resume::{CandidateSummary, ResumeRow};
use crate::models::Pagination;
use crate::skills::candidate_info::EducationEntry;
use crate::skills::SkillExtractor;
use crate::store::TalentStore;

pub const DEFAULT_TOP_N: i64 = 10;
/// Ranking has its own ceiling, independent of listing page sizes.
pub const MAX_TOP_N: i64 = 1000;

/// Missing or non-positive limits rank the default ten.
pub fn top_n(limit: Option<i64>) -> i64 {
    limit
        .filter(|l| *l >= 1)
        .unwrap_or(DEFAULT_TOP_N)
        .min(MAX_TOP_N)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub rank: usize,
    pub resume_id: Uuid,
    pub candidate_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub match_percentage: f64,
    pub rank_score: f64,
    pub semantic_score: f64,
    pub experience_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub total_years_experience: f64,
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub job_id: Uuid,
    pub job_title: String,
    pub total_candidates: usize,
    pub top_candidates: Vec<RankedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobMatches {
    pub matches: Vec<MatchWithCandidate>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    #[serde(flatten)]
    pub record: MatchRow,
    pub candidate: Option<CandidateSummary>,
    pub job: Option<JobRow>,
}

#[derive(Clone)]
pub struct MatchEngine {
    store: Arc<dyn TalentStore>,
    skills: SkillExtractor,
    embeddings: EmbeddingClient,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn TalentStore>, skills: SkillExtractor, embeddings: EmbeddingClient) -> Self {
        Self {
            store,
            skills,
            embeddings,
        }
    }

    /// Scores one pair and upserts the record. Re-running replaces the record.
    pub async fn analyze_one(&self, resume_id: Uuid, job_id: Uuid) -> Result<MatchRow, AppError> {
        let job = self.require_job(job_id).await?;
        let resume = self
            .store
            .find_resume(resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

        let ctx = self.scoring_context(&job).await;
        let scores = score_candidate(&ctx, &resume);
        let record = self.store.upsert_match(job.id, resume.id, &scores).await?;

        info!(
            "Analyzed resume {resume_id} for job {job_id}: rank {}",
            record.rank_score
        );
        Ok(record)
    }

    /// Re-scores every résumé for the job concurrently, then reads back the top N.
    pub async fn rank_for_job(&self, job_id: Uuid, top_n: i64) -> Result<Ranking, AppError> {
        let job = self.require_job(job_id).await?;
        let resumes = self.store.list_resumes().await?;
        if resumes.is_empty() {
            return Err(AppError::NotFound("No resumes found in the system".to_string()));
        }

        let ctx = self.scoring_context(&job).await;
        let tasks = resumes.iter().map(|resume| self.score_and_store(&ctx, &job, resume));
        let written = join_all(tasks).await.into_iter().filter(|ok| *ok).count();
        info!(
            "Ranked job {job_id}: {written}/{} match records written",
            resumes.len()
        );

        let (top, _) = self
            .store
            .query_matches(job.id, &MatchQuery::top(top_n))
            .await?;

        // Résumés deleted since scoring leave orphaned matches; skip them.
        let top_candidates = top
            .into_iter()
            .filter_map(|m| m.candidate.map(|candidate| (m.record, candidate)))
            .enumerate()
            .map(|(i, (record, candidate))| RankedCandidate {
                rank: i + 1,
                resume_id: candidate.id,
                candidate_name: candidate.candidate_name,
                email: candidate.email,
                phone: candidate.phone,
                match_percentage: record.match_percentage,
                rank_score: record.rank_score,
                semantic_score: record.semantic_score,
                experience_score: record.experience_score,
                matched_skills: record.matched_skills,
                missing_skills: record.missing_skills,
                total_years_experience: candidate.total_years_experience,
                education: candidate.education,
            })
            .collect();

        Ok(Ranking {
            job_id: job.id,
            job_title: job.job_title,
            total_candidates: resumes.len(),
            top_candidates,
        })
    }

    pub async fn matches_for_job(&self, job_id: Uuid, query: MatchQuery) -> Result<JobMatches, AppError> {
        self.require_job(job_id).await?;
        let (matches, total) = self.store.query_matches(job_id, &query).await?;
        Ok(JobMatches {
            matches,
            pagination: Pagination::new(query.page, total, "totalMatches"),
        })
    }

    pub async fn get_match(&self, id: Uuid) -> Result<MatchDetail, AppError> {
        let record = self
            .store
            .find_match(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

        let candidate = self
            .store
            .find_resume(record.resume_id)
            .await?
            .as_ref()
            .map(CandidateSummary::from);
        let job = self.store.find_job(record.job_id).await?;

        Ok(MatchDetail {
            record,
            candidate,
            job,
        })
    }

    pub async fn delete_match(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_match(id).await? {
            return Err(AppError::NotFound("Match not found".to_string()));
        }
        Ok(())
    }

    async fn require_job(&self, job_id: Uuid) -> Result<JobRow, AppError> {
        self.store
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
    }

    /// Returns true when the record was written.
    async fn score_and_store(&self, ctx: &ScoringContext, job: &JobRow, resume: &ResumeRow) -> bool {
        let scores = score_candidate(ctx, resume);
        match self.store.upsert_match(job.id, resume.id, &scores).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Skipping resume {} for job {}: match write failed: {e}", resume.id, job.id);
                false
            }
        }
    }

    async fn scoring_context(&self, job: &JobRow) -> ScoringContext {
        let skills = self.resolve_job_skills(job).await;

        let embedding_text = if job.job_description.trim().is_empty() {
            &job.job_title
        } else {
            &job.job_description
        };
        let job_embedding = match self.embeddings.generate(embedding_text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("No job embedding for {}: {e}", job.id);
                Vec::new()
            }
        };

        ScoringContext::new(&skills, job.experience_level.as_deref(), job_embedding)
    }

    /// Cached skills when present, otherwise extracted from the description and cached.
    async fn resolve_job_skills(&self, job: &JobRow) -> Vec<String> {
        let cached = normalize_skills(&job.extracted_skills);
        if !cached.is_empty() {
            return cached;
        }
        if job.job_description.trim().is_empty() {
            return Vec::new();
        }

        let extracted = normalize_skills(&self.skills.extract(&job.job_description).await);
        if !extracted.is_empty() {
            if let Err(e) = self.store.update_job_skills(job.id, &extracted).await {
                warn!("Failed to cache skills for job {}: {e}", job.id);
            }
        }
        extracted
    }
}

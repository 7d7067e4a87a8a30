//! Axum route handlers for the Match API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::{parse_id, AppError};
use crate::matching::engine::{top_n, JobMatches, MatchDetail, Ranking};
use crate::models::matching::{MatchQuery, MatchRow, MatchSort};
use crate::models::{lenient, Page};
use crate::response::{done, ok, ok_data, ApiResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub resume_id: Option<String>,
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRequest {
    pub job_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub min_match: Option<String>,
    pub sort_by: Option<String>,
}

impl MatchListParams {
    fn into_query(self) -> Result<MatchQuery, AppError> {
        let sort_by = match self.sort_by.as_deref() {
            None | Some("") => MatchSort::default(),
            Some(value) => MatchSort::parse(value).ok_or_else(|| {
                AppError::Validation(
                    "sortBy must be one of rankScore, matchPercentage, createdAt".to_string(),
                )
            })?,
        };
        Ok(MatchQuery {
            min_match: lenient::<f64>(self.min_match.as_deref())
                .filter(|m| m.is_finite())
                .unwrap_or(0.0),
            sort_by,
            page: Page::new(lenient(self.page.as_deref()), lenient(self.limit.as_deref())),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<MatchRow> {
    let resume_id = parse_id(request.resume_id.as_deref(), "resumeId")?;
    let job_id = parse_id(request.job_id.as_deref(), "jobId")?;

    let record = state.matcher.analyze_one(resume_id, job_id).await?;
    ok("Match updated successfully", record)
}

/// POST /api/v1/match/rank
///
/// Re-scores every résumé against the job, then returns the top `limit`
/// (default 10, at most 1000).
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> ApiResult<Ranking> {
    let job_id = parse_id(request.job_id.as_deref(), "jobId")?;
    let top_n = top_n(request.limit);

    let ranking = state.matcher.rank_for_job(job_id, top_n).await?;
    let message = format!("Top {top_n} candidates ranked successfully");
    ok(message, ranking)
}

/// GET /api/v1/match/job/:job_id?page=&limit=&minMatch=&sortBy=
pub async fn handle_matches_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Query(params): Query<MatchListParams>,
) -> ApiResult<JobMatches> {
    let job_id = parse_id(Some(&job_id), "jobId")?;
    let query = params.into_query()?;

    let matches = state.matcher.matches_for_job(job_id, query).await?;
    ok("Matches retrieved successfully", matches)
}

/// GET /api/v1/match/:id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MatchDetail> {
    let id = parse_id(Some(&id), "id")?;
    ok_data(state.matcher.get_match(id).await?)
}

/// DELETE /api/v1/match/:id
pub async fn handle_delete_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(Some(&id), "id")?;
    state.matcher.delete_match(id).await?;
    done("Match deleted successfully")
}

//! Axum route handlers for the Job and Résumé APIs.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::catalog::ResumePage;
use crate::errors::{parse_id, AppError};
use crate::models::job::{JobRow, NewJob};
use crate::models::resume::ResumeRow;
use crate::models::PageParams;
use crate::response::{created, done, ok, ok_data, ApiResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub experience_level: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl CreateJobRequest {
    fn into_new_job(self) -> Result<NewJob, AppError> {
        let (Some(job_title), Some(job_description)) = (self.job_title, self.job_description) else {
            return Err(AppError::Validation("jobTitle and jobDescription are required".to_string()));
        };
        Ok(NewJob {
            job_title,
            job_description,
            extracted_skills: self.skills,
            experience_level: self.experience_level.filter(|l| !l.trim().is_empty()),
            company: self.company,
            location: self.location,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResumeRequest {
    pub extracted_text: Option<String>,
    pub file_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<JobRow> {
    let job = state.catalog.create_job(request.into_new_job()?).await?;
    created("Job created successfully", job)
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> ApiResult<Vec<JobRow>> {
    ok("Jobs retrieved successfully", state.catalog.list_jobs().await?)
}

/// GET /api/v1/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<JobRow> {
    let job_id = parse_id(Some(&job_id), "jobId")?;
    ok_data(state.catalog.get_job(job_id).await?)
}

// ────────────────────────────────────────────────────────────────────────────
// Résumés
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Takes text already extracted from the uploaded document.
pub async fn handle_ingest_resume(
    State(state): State<AppState>,
    Json(request): Json<IngestResumeRequest>,
) -> ApiResult<ResumeRow> {
    let text = request
        .extracted_text
        .ok_or_else(|| AppError::Validation("extractedText is required".to_string()))?;
    let resume = state.catalog.ingest_resume(&text, request.file_name).await?;
    created("Resume uploaded successfully", resume)
}

/// GET /api/v1/resumes?page=&limit=
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<ResumePage> {
    let page = params.to_page();
    ok("Resumes fetched successfully", state.catalog.list_resumes(page).await?)
}

/// GET /api/v1/resumes/:resume_id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<String>,
) -> ApiResult<ResumeRow> {
    let resume_id = parse_id(Some(&resume_id), "resumeId")?;
    ok("Resume fetched successfully", state.catalog.get_resume(resume_id).await?)
}

/// DELETE /api/v1/resumes/:resume_id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<String>,
) -> ApiResult<()> {
    let resume_id = parse_id(Some(&resume_id), "resumeId")?;
    state.catalog.delete_resume(resume_id).await?;
    done("Resume deleted successfully")
}

//! Job and résumé catalogue: the records the matching engine and chat read.

pub mod handlers;
pub mod text;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingClient;
use crate::errors::AppError;
use crate::matching::scoring::normalize_skills;
use crate::models::job::{JobRow, NewJob};
use crate::models::resume::{NewResume, ResumeRow};
use crate::models::{Page, Pagination};
use crate::skills::{CandidateInfoExtractor, SkillExtractor};
use crate::store::TalentStore;

#[derive(Debug, Clone, Serialize)]
pub struct ResumePage {
    pub resumes: Vec<ResumeRow>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn TalentStore>,
    skills: SkillExtractor,
    candidate_info: Arc<dyn CandidateInfoExtractor>,
    embeddings: EmbeddingClient,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn TalentStore>,
        skills: SkillExtractor,
        candidate_info: Arc<dyn CandidateInfoExtractor>,
        embeddings: EmbeddingClient,
    ) -> Self {
        Self {
            store,
            skills,
            candidate_info,
            embeddings,
        }
    }

    // ── Jobs ────────────────────────────────────────────────────────────────

    /// Precomputed skills are stored normalized; an empty list is derived lazily
    /// on first analysis.
    pub async fn create_job(&self, mut job: NewJob) -> Result<JobRow, AppError> {
        job.job_title = job.job_title.trim().to_string();
        job.job_description = job.job_description.trim().to_string();
        if job.job_title.is_empty() || job.job_description.is_empty() {
            return Err(AppError::Validation("Invalid title or description".to_string()));
        }
        job.extracted_skills = normalize_skills(&job.extracted_skills);

        let row = self.store.insert_job(job).await?;
        info!("Created job {} ({})", row.id, row.job_title);
        Ok(row)
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobRow>, AppError> {
        Ok(self.store.list_jobs().await?)
    }

    pub async fn get_job(&self, id: Uuid) -> Result<JobRow, AppError> {
        self.store
            .find_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    // ── Résumés ─────────────────────────────────────────────────────────────

    /// Skills and the embedding come from the cleaned text; candidate info from
    /// the raw text, where line breaks still separate the name from the body.
    pub async fn ingest_resume(
        &self,
        raw_text: &str,
        file_name: Option<String>,
    ) -> Result<ResumeRow, AppError> {
        let cleaned = text::clean_text(raw_text);
        if cleaned.is_empty() {
            return Err(AppError::Validation("extractedText is required".to_string()));
        }

        let (skills, info, embedding) = tokio::join!(
            self.skills.extract(&cleaned),
            self.candidate_info.extract(raw_text),
            self.embeddings.generate(&cleaned),
        );
        let embedding = embedding.unwrap_or_else(|e| {
            warn!("Storing resume without embedding: {e}");
            Vec::new()
        });

        let candidate_name = info.display_name();
        let row = self
            .store
            .insert_resume(NewResume {
                file_name,
                candidate_name,
                email: info.email,
                phone: info.phone,
                extracted_text: cleaned,
                extracted_skills: skills,
                total_years_experience: info.experience.total_years,
                experience_details: info.experience.details,
                education: info.education,
                summary: info.summary,
                embedding,
            })
            .await?;

        info!(
            "Ingested resume {} for {} ({} skills, candidate info via {})",
            row.id,
            row.candidate_name,
            row.extracted_skills.len(),
            self.candidate_info.backend()
        );
        Ok(row)
    }

    pub async fn list_resumes(&self, page: Page) -> Result<ResumePage, AppError> {
        let (resumes, total) = self.store.list_resumes_page(page).await?;
        Ok(ResumePage {
            resumes,
            pagination: Pagination::new(page, total, "totalResumes"),
        })
    }

    pub async fn get_resume(&self, id: Uuid) -> Result<ResumeRow, AppError> {
        self.store
            .find_resume(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
    }

    /// Conversations go with the résumé; match records stay until re-ranked or deleted.
    pub async fn delete_resume(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_resume(id).await? {
            return Err(AppError::NotFound("Resume not found".to_string()));
        }
        info!("Deleted resume {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::is_unavailable;
    use crate::skills::RegexCandidateInfoExtractor;
    use crate::store::memory::MemoryStore;
    use crate::test_support::{FailingEmbeddings, HashEmbeddings, ScriptedLlm};

    const RAW_RESUME: &str = "Jane Doe\n\
        jane.doe@example.com | +1 (555) 123-4567\n\
        Senior engineer working with Python, Docker and PostgreSQL.\u{2605}";

    fn catalog(store: Arc<MemoryStore>, failing_embeddings: bool) -> CatalogService {
        let llm = Arc::new(ScriptedLlm::failing());
        let embeddings = if failing_embeddings {
            EmbeddingClient::new(Arc::new(FailingEmbeddings))
        } else {
            EmbeddingClient::new(Arc::new(HashEmbeddings))
        };
        CatalogService::new(
            store,
            SkillExtractor::new(llm),
            Arc::new(RegexCandidateInfoExtractor::new().unwrap()),
            embeddings,
        )
    }

    fn job(title: &str, description: &str, skills: &[&str]) -> NewJob {
        NewJob {
            job_title: title.to_string(),
            job_description: description.to_string(),
            extracted_skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_level: Some("Senior".to_string()),
            company: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_job_validates_and_normalizes() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(store, false);

        let err = catalog.create_job(job("  ", "desc", &[])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let row = catalog
            .create_job(job("Backend", "Build APIs", &[" Rust ", "rust", "SQL"]))
            .await
            .unwrap();
        assert_eq!(row.extracted_skills, vec!["rust", "sql"]);
        assert_eq!(catalog.get_job(row.id).await.unwrap().job_title, "Backend");
    }

    #[tokio::test]
    async fn test_list_jobs_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(store, false);
        catalog.create_job(job("First", "a", &[])).await.unwrap();
        catalog.create_job(job("Second", "b", &[])).await.unwrap();

        let titles: Vec<_> = catalog
            .list_jobs()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.job_title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_ingest_resume() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(store, false);

        let row = catalog
            .ingest_resume(RAW_RESUME, Some("jane.pdf".to_string()))
            .await
            .unwrap();
        assert_eq!(row.candidate_name, "Jane Doe");
        assert_eq!(row.email.as_deref(), Some("jane.doe@example.com"));
        assert!(row.phone.is_some());
        assert!(!row.extracted_text.contains('\n'));
        assert!(!row.extracted_text.contains('\u{2605}'));
        for skill in ["python", "docker", "postgresql"] {
            assert!(row.extracted_skills.iter().any(|s| s.eq_ignore_ascii_case(skill)), "missing {skill}");
        }
        assert!(!is_unavailable(&row.embedding));
    }

    #[tokio::test]
    async fn test_ingest_survives_embedding_outage() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(store, true);
        let row = catalog.ingest_resume(RAW_RESUME, None).await.unwrap();
        assert!(is_unavailable(&row.embedding));
    }

    #[tokio::test]
    async fn test_ingest_rejects_blank_text() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(store, false);
        let err = catalog.ingest_resume(" \u{2605}\n ", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resume_paging_and_delete() {
        let store = Arc::new(MemoryStore::new());
        let catalog = catalog(store.clone(), false);
        let mut ids = Vec::new();
        for i in 0..3 {
            let text = format!("Candidate {i}\nPython developer");
            ids.push(catalog.ingest_resume(&text, None).await.unwrap().id);
        }

        let page = catalog.list_resumes(Page::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(page.resumes.len(), 2);
        assert_eq!(page.resumes[0].id, ids[2]);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);

        catalog.delete_resume(ids[0]).await.unwrap();
        assert!(matches!(catalog.get_resume(ids[0]).await, Err(AppError::NotFound(_))));
        assert!(matches!(catalog.delete_resume(ids[0]).await, Err(AppError::NotFound(_))));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::skills::candidate_info::EducationEntry;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: Uuid,
    pub file_name: Option<String>,
    pub candidate_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub extracted_text: String,
    pub extracted_skills: Vec<String>,
    pub total_years_experience: f64,
    pub experience_details: Option<String>,
    pub education: Json<Vec<EducationEntry>>,
    pub summary: Option<String>,
    /// Empty or all-zero when the provider was unavailable at ingestion time.
    #[serde(skip_serializing, default)]
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub file_name: Option<String>,
    pub candidate_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub extracted_text: String,
    pub extracted_skills: Vec<String>,
    pub total_years_experience: f64,
    pub experience_details: Option<String>,
    pub education: Vec<EducationEntry>,
    pub summary: Option<String>,
    pub embedding: Vec<f32>,
}

/// Row as the database would return it. Used by the in-memory store.
#[cfg(test)]
impl NewResume {
    pub fn into_row(self, id: Uuid, created_at: DateTime<Utc>) -> ResumeRow {
        ResumeRow {
            id,
            file_name: self.file_name,
            candidate_name: self.candidate_name,
            email: self.email,
            phone: self.phone,
            extracted_text: self.extracted_text,
            extracted_skills: self.extracted_skills,
            total_years_experience: self.total_years_experience.max(0.0),
            experience_details: self.experience_details,
            education: Json(self.education),
            summary: self.summary,
            embedding: self.embedding,
            created_at,
        }
    }
}

/// The candidate fields shown alongside match results.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub id: Uuid,
    pub candidate_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub extracted_skills: Vec<String>,
    pub total_years_experience: f64,
    pub education: Vec<EducationEntry>,
}

impl From<&ResumeRow> for CandidateSummary {
    fn from(resume: &ResumeRow) -> Self {
        Self {
            id: resume.id,
            candidate_name: resume.candidate_name.clone(),
            email: resume.email.clone(),
            phone: resume.phone.clone(),
            extracted_skills: resume.extracted_skills.clone(),
            total_years_experience: resume.total_years_experience,
            education: resume.education.0.clone(),
        }
    }
}

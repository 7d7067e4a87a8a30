use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: Uuid,
    pub job_title: String,
    pub job_description: String,
    /// Cached skill list. Empty until the first analysis derives it.
    pub extracted_skills: Vec<String>,
    pub experience_level: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub job_title: String,
    pub job_description: String,
    pub extracted_skills: Vec<String>,
    pub experience_level: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

/// Row as the database would return it. Used by the in-memory store.
#[cfg(test)]
impl NewJob {
    pub fn into_row(self, id: Uuid, created_at: DateTime<Utc>) -> JobRow {
        JobRow {
            id,
            job_title: self.job_title,
            job_description: self.job_description,
            extracted_skills: self.extracted_skills,
            experience_level: self.experience_level,
            company: self.company,
            location: self.location,
            created_at,
        }
    }
}

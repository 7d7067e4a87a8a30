use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::resume::CandidateSummary;
use crate::models::Page;

/// Persisted score for one `(job_id, resume_id)` pair. Replaced wholesale on re-analysis.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Uuid,
    pub match_percentage: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub semantic_score: f64,
    pub experience_score: f64,
    pub rank_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The scored fields of a match, before persistence.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchScores {
    pub match_percentage: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub semantic_score: f64,
    pub experience_score: f64,
    pub rank_score: f64,
}

/// A match joined with its candidate. `candidate` is `None` when the résumé
/// was deleted after scoring.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithCandidate {
    #[serde(flatten)]
    pub record: MatchRow,
    pub candidate: Option<CandidateSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchSort {
    #[default]
    RankScore,
    MatchPercentage,
    CreatedAt,
}

impl MatchSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rankScore" => Some(Self::RankScore),
            "matchPercentage" => Some(Self::MatchPercentage),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::RankScore => "rank_score",
            Self::MatchPercentage => "match_percentage",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Filter, sort and page for a job's matches. Sorting is always descending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchQuery {
    pub min_match: f64,
    pub sort_by: MatchSort,
    pub page: Page,
}

impl MatchQuery {
    /// Highest rank first, no filter. Not bound by the listing page size cap.
    pub fn top(limit: i64) -> Self {
        Self {
            min_match: 0.0,
            sort_by: MatchSort::RankScore,
            page: Page {
                page: 1,
                limit: limit.max(1),
            },
        }
    }
}

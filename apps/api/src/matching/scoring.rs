//! Pure scoring functions for one (job, résumé) pair.
//!
//! rank = 0.5 * skill + 0.3 * experience + 0.2 * semantic, all on a 0–100 scale.

use std::collections::HashSet;

use crate::embedding::{cosine_similarity, is_unavailable};
use crate::models::matching::MatchScores;
use crate::models::resume::ResumeRow;

pub const SKILL_WEIGHT: f64 = 0.5;
pub const EXPERIENCE_WEIGHT: f64 = 0.3;
pub const SEMANTIC_WEIGHT: f64 = 0.2;

/// Required years when a job has no recognizable experience level.
pub const DEFAULT_REQUIRED_YEARS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "entry" => Some(Self::Entry),
            "mid" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            "lead" => Some(Self::Lead),
            _ => None,
        }
    }

    pub fn required_years(&self) -> f64 {
        match self {
            Self::Entry => 2.0,
            Self::Mid => 5.0,
            Self::Senior => 8.0,
            Self::Lead => 10.0,
        }
    }
}

pub fn required_years(level: Option<ExperienceLevel>) -> f64 {
    level.map_or(DEFAULT_REQUIRED_YEARS, |l| l.required_years())
}

/// Everything job-side that scoring needs, resolved once per job.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    job_skills: Vec<String>,
    level: Option<ExperienceLevel>,
    job_embedding: Vec<f32>,
}

impl ScoringContext {
    pub fn new(job_skills: &[String], level: Option<&str>, job_embedding: Vec<f32>) -> Self {
        Self {
            job_skills: normalize_skills(job_skills),
            level: level.and_then(ExperienceLevel::parse),
            job_embedding,
        }
    }

    pub fn job_skills(&self) -> &[String] {
        &self.job_skills
    }
}

/// Lowercase, trim, drop empties, de-duplicate. First occurrence keeps its position.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// `(resume ∩ job, job \ resume)` over normalized skills.
pub fn skill_overlap(job_skills: &[String], resume_skills: &[String]) -> (Vec<String>, Vec<String>) {
    let job: HashSet<&str> = job_skills.iter().map(String::as_str).collect();
    let resume: HashSet<&str> = resume_skills.iter().map(String::as_str).collect();

    let matched = resume_skills
        .iter()
        .filter(|s| job.contains(s.as_str()))
        .cloned()
        .collect();
    let missing = job_skills
        .iter()
        .filter(|s| !resume.contains(s.as_str()))
        .cloned()
        .collect();
    (matched, missing)
}

/// Share of job skills covered, 0–100. Zero when the job lists no skills.
pub fn skill_score(matched: usize, job_total: usize) -> f64 {
    if job_total == 0 {
        return 0.0;
    }
    matched as f64 / job_total as f64 * 100.0
}

pub fn experience_score(years: f64, required: f64) -> f64 {
    if !years.is_finite() || years <= 0.0 {
        return 0.0;
    }
    if years >= required {
        return 100.0;
    }
    years / required * 100.0
}

/// Positive semantic alignment only, 0–100. Missing, zero-sentinel or
/// mismatched embeddings score 0.
pub fn semantic_score(job_embedding: &[f32], resume_embedding: &[f32]) -> f64 {
    if is_unavailable(job_embedding)
        || is_unavailable(resume_embedding)
        || job_embedding.len() != resume_embedding.len()
    {
        return 0.0;
    }
    cosine_similarity(job_embedding, resume_embedding)
        .map(|similarity| (similarity as f64 * 100.0).clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

pub fn rank_score(skill: f64, experience: f64, semantic: f64) -> f64 {
    round2(skill * SKILL_WEIGHT + experience * EXPERIENCE_WEIGHT + semantic * SEMANTIC_WEIGHT)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn score_candidate(ctx: &ScoringContext, resume: &ResumeRow) -> MatchScores {
    let resume_skills = normalize_skills(&resume.extracted_skills);
    let (matched_skills, missing_skills) = skill_overlap(&ctx.job_skills, &resume_skills);

    let skill = skill_score(matched_skills.len(), ctx.job_skills.len());
    let experience = experience_score(resume.total_years_experience, required_years(ctx.level));
    let semantic = semantic_score(&ctx.job_embedding, &resume.embedding);

    MatchScores {
        match_percentage: round2(skill),
        matched_skills,
        missing_skills,
        semantic_score: round2(semantic),
        experience_score: round2(experience),
        rank_score: rank_score(skill, experience, semantic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{zero_vector, EMBEDDING_DIMENSIONS};
    use crate::models::resume::NewResume;
    use crate::skills::candidate_info::EducationEntry;
    use chrono::Utc;
    use uuid::Uuid;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn resume(skill_list: &[&str], years: f64, embedding: Vec<f32>) -> ResumeRow {
        NewResume {
            file_name: None,
            candidate_name: "Test Candidate".to_string(),
            email: None,
            phone: None,
            extracted_text: "text".to_string(),
            extracted_skills: skills(skill_list),
            total_years_experience: years,
            experience_details: None,
            education: Vec::<EducationEntry>::new(),
            summary: None,
            embedding,
        }
        .into_row(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_normalize_skills() {
        let normalized = normalize_skills(&skills(&[" Python", "python ", "", "  ", "SQL"]));
        assert_eq!(normalized, skills(&["python", "sql"]));
    }

    #[test]
    fn test_overlap_partitions_job_skills() {
        let job = skills(&["python", "sql", "docker", "aws"]);
        let resume = skills(&["python", "react", "aws"]);
        let (matched, missing) = skill_overlap(&job, &resume);
        assert_eq!(matched, skills(&["python", "aws"]));
        assert_eq!(missing, skills(&["sql", "docker"]));
        assert_eq!(matched.len() + missing.len(), job.len());
    }

    #[test]
    fn test_overlap_with_empty_resume_misses_everything() {
        let job = skills(&["go", "rust"]);
        let (matched, missing) = skill_overlap(&job, &[]);
        assert!(matched.is_empty());
        assert_eq!(missing, job);
    }

    #[test]
    fn test_skill_score_empty_job_is_zero() {
        assert_eq!(skill_score(0, 0), 0.0);
        assert_eq!(skill_score(1, 2), 50.0);
    }

    #[test]
    fn test_experience_levels() {
        assert_eq!(required_years(ExperienceLevel::parse("Senior")), 8.0);
        assert_eq!(required_years(ExperienceLevel::parse("lead")), 10.0);
        assert_eq!(required_years(ExperienceLevel::parse("Principal")), 5.0);
        assert_eq!(required_years(None), 5.0);
    }

    #[test]
    fn test_experience_score_senior() {
        assert_eq!(experience_score(4.0, 8.0), 50.0);
        assert_eq!(experience_score(10.0, 8.0), 100.0);
        assert_eq!(experience_score(8.0, 8.0), 100.0);
        assert_eq!(experience_score(0.0, 8.0), 0.0);
        assert_eq!(experience_score(f64::NAN, 8.0), 0.0);
    }

    #[test]
    fn test_semantic_score_clamps_negative_to_zero() {
        let mut a = vec![0.0; EMBEDDING_DIMENSIONS];
        let mut b = vec![0.0; EMBEDDING_DIMENSIONS];
        a[0] = 1.0;
        b[0] = -1.0;
        assert_eq!(semantic_score(&a, &b), 0.0);
        assert!((semantic_score(&a, &a) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_semantic_score_unavailable_or_mismatched_is_zero() {
        let v = vec![0.5; EMBEDDING_DIMENSIONS];
        assert_eq!(semantic_score(&zero_vector(), &v), 0.0);
        assert_eq!(semantic_score(&v, &[]), 0.0);
        assert_eq!(semantic_score(&v, &[0.5, 0.5]), 0.0);
    }

    #[test]
    fn test_rank_score_weights_and_rounding() {
        assert_eq!(rank_score(100.0, 100.0, 100.0), 100.0);
        assert_eq!(rank_score(50.0, 50.0, 0.0), 40.0);
        assert_eq!(rank_score(33.333, 66.667, 12.345), 39.14);
    }

    #[test]
    fn test_score_candidate_scenario() {
        let ctx = ScoringContext::new(&skills(&["Python", "SQL"]), Some("Senior"), Vec::new());
        let scores = score_candidate(&ctx, &resume(&["python", "React"], 4.0, Vec::new()));
        assert_eq!(scores.matched_skills, skills(&["python"]));
        assert_eq!(scores.missing_skills, skills(&["sql"]));
        assert_eq!(scores.match_percentage, 50.0);
        assert_eq!(scores.experience_score, 50.0);
        assert_eq!(scores.semantic_score, 0.0);
        assert_eq!(scores.rank_score, 40.0);
    }

    #[test]
    fn test_score_candidate_is_deterministic() {
        let embedding: Vec<f32> = (0..EMBEDDING_DIMENSIONS).map(|i| (i % 7) as f32).collect();
        let ctx = ScoringContext::new(&skills(&["rust"]), Some("Mid"), embedding.clone());
        let candidate = resume(&["Rust"], 3.0, embedding);
        assert_eq!(score_candidate(&ctx, &candidate), score_candidate(&ctx, &candidate));
    }
}

//! Skill Extractor: free text to a de-duplicated skill list.
//!
//! Primary path asks the LLM for a comma-separated list. Any provider error, or a
//! reply that parses to nothing, falls back to substring matching against a
//! curated vocabulary. `extract` never fails.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::llm_client::CompletionProvider;
use crate::skills::prompts::{SKILL_EXTRACTION_PROMPT, SKILL_EXTRACTION_SYSTEM};

/// Only this many leading characters are sent to the model.
pub const MAX_INPUT_CHARS: usize = 4000;
pub const MAX_LLM_SKILLS: usize = 40;
/// Entries this long or longer are sentences, not skills.
pub const MAX_SKILL_LEN: usize = 40;
pub const MAX_FALLBACK_SKILLS: usize = 30;

/// Curated fallback vocabulary. Order is significant: fallback output follows it.
pub const SKILL_VOCABULARY: &[&str] = &[
    // Programming languages
    "JavaScript", "Python", "Java", "TypeScript", "C++", "C#", "PHP", "Ruby", "Go", "Rust",
    "Swift", "Kotlin", "Scala", "R", "MATLAB",
    // Frontend
    "React", "Angular", "Vue.js", "Next.js", "Svelte", "HTML", "CSS", "Tailwind",
    "Bootstrap", "jQuery", "Redux", "Webpack",
    // Backend
    "Node.js", "Express", "Django", "Flask", "Spring Boot", "FastAPI", "Ruby on Rails",
    "ASP.NET", "Laravel", "NestJS",
    // Databases
    "MongoDB", "PostgreSQL", "MySQL", "Redis", "Cassandra", "DynamoDB", "SQLite",
    "Oracle", "SQL Server", "Elasticsearch",
    // Cloud & DevOps
    "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Jenkins", "CI/CD", "Terraform",
    "Ansible", "Linux", "Git", "GitHub", "GitLab",
    // AI/ML
    "Machine Learning", "Deep Learning", "TensorFlow", "PyTorch", "Scikit-learn",
    "NLP", "Computer Vision",
    // Other
    "REST API", "GraphQL", "Microservices", "Agile", "Scrum", "JIRA", "WebSocket",
];

#[derive(Clone)]
pub struct SkillExtractor {
    llm: Arc<dyn CompletionProvider>,
}

impl SkillExtractor {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            warn!("Empty text provided for skill extraction");
            return Vec::new();
        }

        let limited: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let prompt = SKILL_EXTRACTION_PROMPT.replace("{text}", &limited);

        match self.llm.complete(&prompt, SKILL_EXTRACTION_SYSTEM).await {
            Ok(reply) => {
                let skills = parse_skill_list(&reply);
                if skills.is_empty() {
                    warn!("Skill extraction reply contained no usable skills, using keyword fallback");
                    return extract_skills_fallback(text);
                }
                info!("Extracted {} skills via LLM", skills.len());
                skills
            }
            Err(e) => {
                warn!("Skill extraction provider failed, using keyword fallback: {e}");
                extract_skills_fallback(text)
            }
        }
    }
}

/// Parses a model reply into at most `MAX_LLM_SKILLS` unique skills.
///
/// Case-insensitive duplicates keep the first spelling seen.
pub fn parse_skill_list(reply: &str) -> Vec<String> {
    let cleaned = reply.replace("```", "").replace('\n', ",");

    let candidates = cleaned
        .split(',')
        .map(|s| strip_skills_label(s.trim()).trim())
        .filter(|s| !s.is_empty() && s.chars().count() < MAX_SKILL_LEN)
        .filter(|s| !is_numbered_item(s))
        .take(MAX_LLM_SKILLS);

    let mut seen = HashSet::new();
    let mut skills = Vec::new();
    for skill in candidates {
        if seen.insert(skill.to_lowercase()) {
            skills.push(skill.to_string());
        }
    }
    skills
}

fn strip_skills_label(s: &str) -> &str {
    const LABEL: &str = "skills:";
    match s.get(..LABEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LABEL) => &s[LABEL.len()..],
        _ => s,
    }
}

/// `1. Python`, `12.Rust` and similar list-numbering artifacts.
fn is_numbered_item(s: &str) -> bool {
    let digits = s.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && s[digits..].starts_with('.')
}

/// Deterministic keyword fallback: vocabulary terms found in the text, in vocabulary order.
pub fn extract_skills_fallback(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let found: Vec<String> = SKILL_VOCABULARY
        .iter()
        .filter(|skill| contains_term(&lower, &skill.to_lowercase()))
        .take(MAX_FALLBACK_SKILLS)
        .map(|s| s.to_string())
        .collect();
    info!("Fallback skill extraction found {} skills", found.len());
    found
}

/// Plain substring match. Terms of two characters or fewer ("R", "Go", "C#") must
/// also sit on word boundaries, otherwise they match almost any text.
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.chars().count() > 2 {
        return haystack.contains(term);
    }
    haystack.match_indices(term).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric()) && !after.is_some_and(|c| c.is_alphanumeric())
    })
}

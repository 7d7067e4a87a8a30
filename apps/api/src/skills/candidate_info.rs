//! Candidate info extraction: name, contact details, experience, education.
//!
//! Two interchangeable backends behind `CandidateInfoExtractor`. The LLM backend
//! asks for a JSON object; the regex backend is deterministic and offline. Neither
//! fails: anything unparseable becomes `CandidateInfo::unknown()`.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{parse_json_response, CompletionProvider};
use crate::skills::prompts::CANDIDATE_INFO_PROMPT;

pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";

/// Only this many leading characters are sent to the model.
pub const MAX_INPUT_CHARS: usize = 3000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: ExperienceSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSummary {
    /// Missing, null or unparseable values count as zero years.
    #[serde(default, deserialize_with = "lenient_years")]
    pub total_years: f64,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    /// Models return years as both `"2020"` and `2020`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
}

impl CandidateInfo {
    pub fn unknown() -> Self {
        Self {
            name: Some(UNKNOWN_CANDIDATE.to_string()),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_CANDIDATE)
            .to_string()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let years = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        // "5+", "3.5 years"
        Some(Value::String(s)) => s
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .find(|part| !part.is_empty())
            .and_then(|part| part.parse().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if years.is_finite() { years.max(0.0) } else { 0.0 })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ────────────────────────────────────────────────────────────
// Extractors
// ────────────────────────────────────────────────────────────

#[async_trait]
pub trait CandidateInfoExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> CandidateInfo;

    fn backend(&self) -> &'static str;
}

pub struct LlmCandidateInfoExtractor {
    llm: Arc<dyn CompletionProvider>,
}

impl LlmCandidateInfoExtractor {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CandidateInfoExtractor for LlmCandidateInfoExtractor {
    async fn extract(&self, text: &str) -> CandidateInfo {
        if text.trim().is_empty() {
            return CandidateInfo::unknown();
        }

        let limited: String = text.chars().take(MAX_INPUT_CHARS).collect();
        let prompt = CANDIDATE_INFO_PROMPT.replace("{resume_text}", &limited);

        let reply = match self.llm.complete(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Candidate info extraction failed: {e}");
                return CandidateInfo::unknown();
            }
        };

        match parse_json_response::<CandidateInfo>(&reply) {
            Ok(info) => {
                info!("Extracted candidate info for {}", info.display_name());
                info
            }
            Err(e) => {
                warn!("Candidate info reply was not valid JSON: {e}");
                CandidateInfo::unknown()
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";
const PHONE_PATTERN: &str = r"\+?\d[\d\s().-]{7,}\d";
const MAX_NAME_WORDS: usize = 5;

/// Offline extractor: email and phone by pattern, name from the first short line.
pub struct RegexCandidateInfoExtractor {
    email: Regex,
    phone: Regex,
}

impl RegexCandidateInfoExtractor {
    /// Compiles the contact patterns up front so a bad pattern fails startup.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
        })
    }
}

fn first_match(re: &Regex, text: &str) -> Option<String> {
    re.find(text).map(|m| m.as_str().trim().to_string())
}

fn guess_name(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let words = line.split_whitespace().count();
    let looks_like_name = words <= MAX_NAME_WORDS
        && !line.contains('@')
        && !line.chars().any(|c| c.is_ascii_digit());
    looks_like_name.then(|| line.to_string())
}

#[async_trait]
impl CandidateInfoExtractor for RegexCandidateInfoExtractor {
    async fn extract(&self, text: &str) -> CandidateInfo {
        CandidateInfo {
            name: Some(guess_name(text).unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string())),
            email: first_match(&self.email, text),
            phone: first_match(&self.phone, text),
            ..Default::default()
        }
    }

    fn backend(&self) -> &'static str {
        "regex"
    }
}

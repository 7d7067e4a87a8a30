use anyhow::{Context, Result};

use crate::embedding::huggingface::DEFAULT_EMBEDDING_API_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub huggingface_api_key: String,
    pub embedding_api_url: String,
    /// Candidate info via the LLM when true, the offline regex extractor otherwise.
    pub enable_llm_candidate_info: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            huggingface_api_key: require_env("HUGGINGFACE_API_KEY")?,
            embedding_api_url: std::env::var("EMBEDDING_API_URL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_API_URL.to_string()),
            enable_llm_candidate_info: parse_flag(
                std::env::var("ENABLE_LLM_CANDIDATE_INFO").ok().as_deref(),
                true,
            )
            .context("ENABLE_LLM_CANDIDATE_INFO must be true or false")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(value: Option<&str>, default: bool) -> Option<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Some(default),
        Some("true" | "1" | "yes") => Some(true),
        Some("false" | "0" | "no") => Some(false),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(None, true), Some(true));
        assert_eq!(parse_flag(Some(""), false), Some(false));
        assert_eq!(parse_flag(Some("FALSE"), true), Some(false));
        assert_eq!(parse_flag(Some(" 1 "), false), Some(true));
        assert_eq!(parse_flag(Some("maybe"), true), None);
    }
}

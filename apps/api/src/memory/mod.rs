//! Conversation Memory Manager.
//!
//! The message list is the source of truth. `MemoryContext` is a derived cache
//! rebuilt from it (and the résumé) after every mutation.

use chrono::Utc;

use crate::models::conversation::{ChatMessage, MemoryContext, Role};
use crate::models::resume::ResumeRow;

pub const NO_HISTORY: &str = "No previous conversation.";

/// Messages fed back into the answer prompt.
pub const HISTORY_WINDOW: usize = 5;

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("experience", &["experience", "work", "job", "role", "position"]),
    (
        "skills",
        &[
            "skill", "technology", "tech", "programming", "language", "react", "python",
            "javascript", "java", "sql", "framework", "stack", "tool",
        ],
    ),
    ("education", &["education", "degree", "university", "college", "study"]),
    ("projects", &["project", "built", "developed", "created"]),
    ("achievements", &["achievement", "award", "accomplishment"]),
    ("salary", &["salary", "compensation", "pay"]),
    ("availability", &["available", "join", "start", "notice"]),
];

/// Renders the last `last_n` messages as prompt history.
pub fn format_history(messages: &[ChatMessage], last_n: usize) -> String {
    let recent = &messages[messages.len().saturating_sub(last_n)..];
    if recent.is_empty() {
        return NO_HISTORY.to_string();
    }

    let lines = recent
        .iter()
        .map(|m| match m.role {
            Role::User => format!("User: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("Previous Conversation:\n{lines}")
}

/// Topics whose keywords appear (case-insensitive substring) in any message,
/// listed in topic-table order.
pub fn extract_topics(messages: &[ChatMessage]) -> Vec<String> {
    let contents: Vec<String> = messages.iter().map(|m| m.content.to_lowercase()).collect();
    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            contents
                .iter()
                .any(|content| keywords.iter().any(|k| content.contains(k)))
        })
        .map(|(topic, _)| (*topic).to_string())
        .collect()
}

pub fn generate_summary(messages: &[ChatMessage], topics: &[String]) -> String {
    if messages.is_empty() {
        return "No conversation yet.".to_string();
    }
    let questions = messages.iter().filter(|m| m.role == Role::User).count();
    if questions == 0 {
        return "No questions asked yet.".to_string();
    }
    if topics.is_empty() {
        return format!("{questions} questions asked. General conversation.");
    }
    let topics = topics.join(", ");
    format!("{questions} questions asked. Discussed topics: {topics}.")
}

/// Identity facts only: empty topics, zero count, no summary.
pub fn initial_context(resume: &ResumeRow) -> MemoryContext {
    MemoryContext {
        candidate_name: resume.candidate_name.clone(),
        candidate_id: resume.id,
        skills: resume.extracted_skills.clone(),
        total_years: resume.total_years_experience,
        last_updated: Utc::now(),
        ..MemoryContext::default()
    }
}

pub fn build_memory_context(messages: &[ChatMessage], resume: &ResumeRow) -> MemoryContext {
    let discussed_topics = extract_topics(messages);
    let summary = generate_summary(messages, &discussed_topics);
    MemoryContext {
        discussed_topics,
        message_count: messages.len(),
        summary: Some(summary),
        ..initial_context(resume)
    }
}

/// Resets a context to the candidate identity it was built for.
pub fn clear_context(context: &MemoryContext) -> MemoryContext {
    MemoryContext {
        candidate_name: context.candidate_name.clone(),
        candidate_id: context.candidate_id,
        skills: context.skills.clone(),
        total_years: context.total_years,
        last_updated: Utc::now(),
        ..MemoryContext::default()
    }
}

pub fn was_topic_discussed(context: &MemoryContext, topic: &str) -> bool {
    let topic = topic.to_lowercase();
    context.discussed_topics.iter().any(|t| *t == topic)
}

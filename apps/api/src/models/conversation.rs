use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Derived per-session cache. Rebuilt wholesale from the message list and the
/// résumé on every mutation; never the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryContext {
    pub candidate_name: String,
    pub candidate_id: Uuid,
    pub skills: Vec<String>,
    pub total_years: f64,
    /// In topic-table order, without duplicates.
    pub discussed_topics: Vec<String>,
    pub message_count: usize,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_response: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub user_id: String,
    pub messages: Json<Vec<ChatMessage>>,
    pub memory_context: Json<MemoryContext>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversation joined with its candidate's name and email, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationListRow {
    #[sqlx(flatten)]
    pub conversation: ConversationRow,
    pub candidate_name: Option<String>,
    pub candidate_email: Option<String>,
}

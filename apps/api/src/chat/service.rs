//! Résumé Q&A sessions: conversation lifecycle around the RAG pipeline.
//!
//! A failed answer persists nothing. Messages and memory are only written after
//! the assistant reply exists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::memory::{
    build_memory_context, clear_context, format_history, initial_context, was_topic_discussed,
    HISTORY_WINDOW, NO_HISTORY,
};
use crate::models::conversation::{ChatMessage, ConversationRow, MemoryContext};
use crate::models::resume::ResumeRow;
use crate::models::{Page, Pagination};
use crate::rag::{BatchAnswer, PromptContext, RagPipeline};
use crate::store::{ConversationStore, TalentStore};

pub const DEFAULT_USER_ID: &str = "demo-user";

/// Characters of the last message shown in conversation listings.
const PREVIEW_CHARS: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedConversation {
    pub conversation_id: Uuid,
    pub resume_id: Uuid,
    pub candidate_name: String,
    pub user_id: String,
    pub message_count: usize,
    /// False when an active session was reused.
    #[serde(skip)]
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub conversation_id: Uuid,
    pub user_message: String,
    pub ai_response: String,
    pub timestamp: DateTime<Utc>,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub total_years_experience: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub conversation_id: Uuid,
    pub candidate: ConversationCandidate,
    pub messages: Vec<ChatMessage>,
    pub memory_context: MemoryContext,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedConversation {
    pub conversation_id: Uuid,
    pub messages_deleted: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedConversation {
    pub conversation_id: Uuid,
    pub messages_cleared: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub conversation_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: Option<String>,
    pub message_count: usize,
    pub last_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserConversations {
    pub conversations: Vec<ConversationSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickAnswer {
    pub question: String,
    pub answer: String,
    pub candidate_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnswers {
    pub candidate_name: String,
    pub total_questions: usize,
    pub results: Vec<BatchAnswer>,
}

// ────────────────────────────────────────────────────────────────────────────
// Service
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ChatService {
    conversations: Arc<dyn ConversationStore>,
    talent: Arc<dyn TalentStore>,
    rag: RagPipeline,
}

impl ChatService {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        talent: Arc<dyn TalentStore>,
        rag: RagPipeline,
    ) -> Self {
        Self {
            conversations,
            talent,
            rag,
        }
    }

    /// Reuses the active session for `(resume, user)` when one exists.
    pub async fn start(&self, resume_id: Uuid, user_id: &str) -> Result<StartedConversation, AppError> {
        let resume = self.require_resume(resume_id).await?;

        if let Some(existing) = self
            .conversations
            .find_active_conversation(resume_id, user_id)
            .await?
        {
            return Ok(StartedConversation {
                conversation_id: existing.id,
                resume_id,
                candidate_name: resume.candidate_name,
                user_id: existing.user_id,
                message_count: existing.messages.len(),
                created: false,
            });
        }

        let conversation = self
            .conversations
            .insert_conversation(resume_id, user_id, &initial_context(&resume))
            .await?;
        info!("Started conversation {} for resume {resume_id}", conversation.id);

        Ok(StartedConversation {
            conversation_id: conversation.id,
            resume_id,
            candidate_name: resume.candidate_name,
            user_id: conversation.user_id,
            message_count: 0,
            created: true,
        })
    }

    pub async fn send(&self, conversation_id: Uuid, message: &str) -> Result<SentMessage, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let conversation = self.require_conversation(conversation_id).await?;
        let resume = self
            .talent
            .find_resume(conversation.resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found for this conversation".to_string()))?;

        let history = format_history(&conversation.messages, HISTORY_WINDOW);
        let context = PromptContext::for_resume(&resume, history);
        let reply = self
            .rag
            .answer(&resume.extracted_text, message, &context)
            .await?;

        let assistant = ChatMessage::assistant(reply.clone());
        let timestamp = assistant.timestamp;
        let exchange = [ChatMessage::user(message), assistant];
        let rebuild = |messages: &[ChatMessage]| {
            let mut memory = build_memory_context(messages, &resume);
            memory.last_question = Some(message.to_string());
            memory.last_response = Some(reply.clone());
            memory
        };

        // History above was read without a lock; the append itself is atomic.
        let saved = self
            .conversations
            .append_exchange(conversation_id, &exchange, &rebuild)
            .await?
            .ok_or_else(conversation_not_found)?;

        let new_topics: Vec<&str> = saved
            .memory_context
            .discussed_topics
            .iter()
            .filter(|t| !was_topic_discussed(&conversation.memory_context.0, t))
            .map(String::as_str)
            .collect();
        if !new_topics.is_empty() {
            debug!("Conversation {conversation_id}: new topics {}", new_topics.join(", "));
        }
        let message_count = saved.messages.len();
        info!("Conversation {conversation_id}: {message_count} messages");

        Ok(SentMessage {
            conversation_id,
            user_message: message.to_string(),
            ai_response: reply,
            timestamp,
            message_count,
        })
    }

    pub async fn get(&self, conversation_id: Uuid) -> Result<ConversationView, AppError> {
        let conversation = self.require_conversation(conversation_id).await?;
        let resume = self.talent.find_resume(conversation.resume_id).await?;
        Ok(view(conversation, resume.as_ref()))
    }

    pub async fn delete(&self, conversation_id: Uuid) -> Result<DeletedConversation, AppError> {
        let deleted = self
            .conversations
            .delete_conversation(conversation_id)
            .await?
            .ok_or_else(conversation_not_found)?;
        Ok(DeletedConversation {
            conversation_id,
            messages_deleted: deleted.messages.len(),
        })
    }

    /// Empties the messages but keeps the session and the candidate identity.
    pub async fn clear(&self, conversation_id: Uuid) -> Result<ClearedConversation, AppError> {
        let conversation = self.require_conversation(conversation_id).await?;
        let messages_cleared = conversation.messages.len();
        let memory = clear_context(&conversation.memory_context);

        self.conversations
            .save_conversation(conversation_id, &[], &memory)
            .await?;
        Ok(ClearedConversation {
            conversation_id,
            messages_cleared,
        })
    }

    /// Most recently active first.
    pub async fn list_for_user(&self, user_id: &str, page: Page) -> Result<UserConversations, AppError> {
        let (rows, total) = self
            .conversations
            .list_conversations_for_user(user_id, page)
            .await?;

        let conversations = rows
            .into_iter()
            .map(|row| {
                let conversation = row.conversation;
                ConversationSummary {
                    conversation_id: conversation.id,
                    candidate_name: row
                        .candidate_name
                        .unwrap_or_else(|| conversation.memory_context.candidate_name.clone()),
                    candidate_email: row.candidate_email,
                    message_count: conversation.messages.len(),
                    last_message: conversation
                        .messages
                        .last()
                        .map(|m| m.content.chars().take(PREVIEW_CHARS).collect()),
                    updated_at: conversation.updated_at,
                    is_active: conversation.is_active,
                }
            })
            .collect();

        Ok(UserConversations {
            conversations,
            pagination: Pagination::new(page, total, "totalConversations"),
        })
    }

    /// One-off question with no session and no history.
    pub async fn quick_ask(&self, resume_id: Uuid, question: &str) -> Result<QuickAnswer, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("question is required".to_string()));
        }
        let resume = self.require_resume(resume_id).await?;
        let context = PromptContext::for_resume(&resume, NO_HISTORY.to_string());
        let answer = self
            .rag
            .answer(&resume.extracted_text, question, &context)
            .await?;

        Ok(QuickAnswer {
            question: question.to_string(),
            answer,
            candidate_name: resume.candidate_name,
        })
    }

    pub async fn batch_ask(&self, resume_id: Uuid, questions: &[String]) -> Result<BatchAnswers, AppError> {
        if questions.is_empty() {
            return Err(AppError::Validation("questions must be a non-empty array".to_string()));
        }
        let resume = self.require_resume(resume_id).await?;
        let context = PromptContext::for_resume(&resume, NO_HISTORY.to_string());
        let results = self
            .rag
            .batch_answer(&resume.extracted_text, questions, &context)
            .await?;

        Ok(BatchAnswers {
            candidate_name: resume.candidate_name,
            total_questions: results.len(),
            results,
        })
    }

    async fn require_resume(&self, resume_id: Uuid) -> Result<ResumeRow, AppError> {
        self.talent
            .find_resume(resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
    }

    async fn require_conversation(&self, id: Uuid) -> Result<ConversationRow, AppError> {
        self.conversations
            .find_conversation(id)
            .await?
            .ok_or_else(conversation_not_found)
    }
}

fn conversation_not_found() -> AppError {
    AppError::NotFound("Conversation not found".to_string())
}

/// Falls back to the memory snapshot when the résumé is gone.
fn view(conversation: ConversationRow, resume: Option<&ResumeRow>) -> ConversationView {
    let memory = conversation.memory_context.0;
    let candidate = match resume {
        Some(r) => ConversationCandidate {
            id: r.id,
            name: r.candidate_name.clone(),
            email: r.email.clone(),
            phone: r.phone.clone(),
            skills: r.extracted_skills.clone(),
            total_years_experience: r.total_years_experience,
        },
        None => ConversationCandidate {
            id: memory.candidate_id,
            name: memory.candidate_name.clone(),
            email: None,
            phone: None,
            skills: memory.skills.clone(),
            total_years_experience: memory.total_years,
        },
    };
    let messages = conversation.messages.0;

    ConversationView {
        conversation_id: conversation.id,
        candidate,
        message_count: messages.len(),
        messages,
        memory_context: memory,
        is_active: conversation.is_active,
        created_at: conversation.created_at,
        updated_at: conversation.updated_at,
    }
}

//! Axum route handlers for the Chat API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::chat::service::{
    BatchAnswers, ClearedConversation, ConversationView, DeletedConversation, QuickAnswer,
    SentMessage, StartedConversation, UserConversations, DEFAULT_USER_ID,
};
use crate::errors::{parse_id, AppError};
use crate::models::PageParams;
use crate::response::{created, ok, ok_data, ApiResult};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub resume_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub conversation_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickAskRequest {
    pub resume_id: Option<String>,
    pub question: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAskRequest {
    pub resume_id: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chat/start-conversation
///
/// 201 for a new session, 200 when the active one is reused.
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> ApiResult<StartedConversation> {
    let resume_id = parse_id(request.resume_id.as_deref(), "resumeId")?;
    let user_id = request
        .user_id
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

    let started = state.chat.start(resume_id, &user_id).await?;
    if started.created {
        created("Conversation started successfully", started)
    } else {
        ok("Active conversation already exists", started)
    }
}

/// POST /api/v1/chat/send-message
pub async fn handle_send(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> ApiResult<SentMessage> {
    let conversation_id = parse_id(request.conversation_id.as_deref(), "conversationId")?;
    let message = request
        .message
        .ok_or_else(|| AppError::Validation("message is required".to_string()))?;

    let sent = state.chat.send(conversation_id, &message).await?;
    ok("Message sent successfully", sent)
}

/// GET /api/v1/chat/get-conversation/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ConversationView> {
    let id = parse_id(Some(&id), "conversationId")?;
    ok_data(state.chat.get(id).await?)
}

/// DELETE /api/v1/chat/delete-conversation/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedConversation> {
    let id = parse_id(Some(&id), "conversationId")?;
    ok("Conversation deleted successfully", state.chat.delete(id).await?)
}

/// POST /api/v1/chat/clear/:id
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ClearedConversation> {
    let id = parse_id(Some(&id), "conversationId")?;
    ok("Conversation cleared successfully", state.chat.clear(id).await?)
}

/// GET /api/v1/chat/conversations/user/:user_id?page=&limit=
pub async fn handle_list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<UserConversations> {
    let page = params.to_page();
    ok_data(state.chat.list_for_user(&user_id, page).await?)
}

/// POST /api/v1/chat/quick-ask
pub async fn handle_quick_ask(
    State(state): State<AppState>,
    Json(request): Json<QuickAskRequest>,
) -> ApiResult<QuickAnswer> {
    let resume_id = parse_id(request.resume_id.as_deref(), "resumeId")?;
    let question = required_text(request.question, "question")?;
    ok_data(state.chat.quick_ask(resume_id, &question).await?)
}

/// POST /api/v1/chat/batch-ask
pub async fn handle_batch_ask(
    State(state): State<AppState>,
    Json(request): Json<BatchAskRequest>,
) -> ApiResult<BatchAnswers> {
    let resume_id = parse_id(request.resume_id.as_deref(), "resumeId")?;
    if request.questions.iter().any(|q| q.trim().is_empty()) {
        return Err(AppError::Validation("questions must not contain blank entries".to_string()));
    }
    let batch = state.chat.batch_ask(resume_id, &request.questions).await?;
    ok("Batch questions processed", batch)
}

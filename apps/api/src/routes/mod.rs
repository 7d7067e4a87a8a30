pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::chat::handlers as chat;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job API
        .route(
            "/api/v1/jobs",
            post(catalog::handle_create_job).get(catalog::handle_list_jobs),
        )
        .route("/api/v1/jobs/:job_id", get(catalog::handle_get_job))
        // Resume API
        .route(
            "/api/v1/resumes",
            post(catalog::handle_ingest_resume).get(catalog::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/:resume_id",
            get(catalog::handle_get_resume).delete(catalog::handle_delete_resume),
        )
        // Match API
        .route("/api/v1/match/analyze", post(matching::handle_analyze))
        .route("/api/v1/match/rank", post(matching::handle_rank))
        .route(
            "/api/v1/match/job/:job_id",
            get(matching::handle_matches_for_job),
        )
        .route(
            "/api/v1/match/:id",
            get(matching::handle_get_match).delete(matching::handle_delete_match),
        )
        // Chat API
        .route("/api/v1/chat/start-conversation", post(chat::handle_start))
        .route("/api/v1/chat/send-message", post(chat::handle_send))
        .route("/api/v1/chat/get-conversation/:id", get(chat::handle_get))
        .route(
            "/api/v1/chat/delete-conversation/:id",
            delete(chat::handle_delete),
        )
        .route(
            "/api/v1/chat/conversations/user/:user_id",
            get(chat::handle_list_for_user),
        )
        .route("/api/v1/chat/clear/:id", post(chat::handle_clear))
        .route("/api/v1/chat/quick-ask", post(chat::handle_quick_ask))
        .route("/api/v1/chat/batch-ask", post(chat::handle_batch_ask))
        .with_state(state)
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::embedding::EmbeddingError;
use crate::rag::RagError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Answer generation failed. Never absorbed: a fabricated answer is worse.
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RagError> for AppError {
    fn from(e: RagError) -> Self {
        match e {
            RagError::Embedding(e) => AppError::from(e),
            other => AppError::Generation(other.to_string()),
        }
    }
}

impl From<EmbeddingError> for AppError {
    fn from(e: EmbeddingError) -> Self {
        match e {
            EmbeddingError::EmptyInput => AppError::Validation(e.to_string()),
            EmbeddingError::DimensionMismatch { left, right } => {
                AppError::DimensionMismatch(format!("{left} vs {right}"))
            }
            EmbeddingError::Provider(msg) => AppError::Generation(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DimensionMismatch(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DIMENSION_MISMATCH",
                format!("Vectors must have same dimensions ({msg})"),
            ),
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FAILED",
                    "The answer could not be generated. Please try again.".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Parses a required identifier from a request body or path.
pub fn parse_id(value: Option<&str>, field: &str) -> Result<Uuid, AppError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))?;
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("{field} must be a valid UUID")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(Some(&id.to_string()), "jobId").unwrap(), id);
        assert!(matches!(parse_id(None, "jobId"), Err(AppError::Validation(m)) if m == "jobId is required"));
        assert!(matches!(parse_id(Some("  "), "jobId"), Err(AppError::Validation(_))));
        assert!(matches!(
            parse_id(Some("not-a-uuid"), "jobId"),
            Err(AppError::Validation(m)) if m == "jobId must be a valid UUID"
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::DimensionMismatch("2 vs 3".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Generation("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_rag_errors_surface_as_generation_failures() {
        let err: AppError = RagError::Generation(LlmError::EmptyContent).into();
        assert!(matches!(err, AppError::Generation(_)));

        let err: AppError =
            RagError::Embedding(EmbeddingError::DimensionMismatch { left: 2, right: 3 }).into();
        assert!(matches!(err, AppError::DimensionMismatch(_)));
    }
}

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Success envelope shared by every API route: `{ success, message?, data? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), crate::errors::AppError>;

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult<T> {
    respond(StatusCode::OK, Some(message.into()), Some(data))
}

pub fn ok_data<T: Serialize>(data: T) -> ApiResult<T> {
    respond(StatusCode::OK, None, Some(data))
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult<T> {
    respond(StatusCode::CREATED, Some(message.into()), Some(data))
}

/// Message only, no payload.
pub fn done(message: impl Into<String>) -> ApiResult<()> {
    respond(StatusCode::OK, Some(message.into()), None)
}

fn respond<T: Serialize>(status: StatusCode, message: Option<String>, data: Option<T>) -> ApiResult<T> {
    Ok((
        status,
        Json(ApiResponse {
            success: true,
            message,
            data,
        }),
    ))
}

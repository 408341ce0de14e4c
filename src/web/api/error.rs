use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::ephemeris::{DegenerateInput, EpochError, QueryError};
use crate::source::SourceError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Degenerate(DegenerateInput),
    Unavailable,
    Source(SourceError),
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::InvalidParameter(msg) => ApiError::Validation(msg),
            QueryError::NotFound(_) => ApiError::NotFound(e.to_string()),
            QueryError::Empty => ApiError::Unavailable,
        }
    }
}

impl From<EpochError> for ApiError {
    fn from(e: EpochError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<DegenerateInput> for ApiError {
    fn from(e: DegenerateInput) -> Self {
        ApiError::Degenerate(e)
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        ApiError::Source(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("invalid_parameter", &msg)),
            )
                .into_response(),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message("not_found", &msg)),
            )
                .into_response(),
            ApiError::Degenerate(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::with_message("degenerate_input", &e.to_string())),
            )
                .into_response(),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("ephemeris_unavailable")),
            )
                .into_response(),
            ApiError::Source(e) => {
                log::error!("Ephemeris refresh failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse::with_message("source_error", &e.to_string())),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

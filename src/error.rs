use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    /// Absent, time-expired and quota-exhausted pastes are deliberately
    /// indistinguishable to the caller.
    #[error("Paste unavailable")]
    NotFound,
    #[error("content must be a non-empty string")]
    EmptyContent,
    #[error("ttl_seconds must be an integer >= 1")]
    InvalidTtl,
    #[error("max_views must be an integer >= 1")]
    InvalidMaxViews,
    #[error("time override header must be an integer epoch millisecond timestamp")]
    InvalidTimeOverride,
    #[error("{0}")]
    InvalidBody(String),
    #[error("paste id collision")]
    IdCollision,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EmptyContent => StatusCode::BAD_REQUEST,
            ApiError::InvalidTtl => StatusCode::BAD_REQUEST,
            ApiError::InvalidMaxViews => StatusCode::BAD_REQUEST,
            ApiError::InvalidTimeOverride => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::IdCollision => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, Json(json!({ "error": format!("{self}") }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

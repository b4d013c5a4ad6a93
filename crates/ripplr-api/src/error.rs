use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API-level error, rendered as `{"detail": "..."}` with the matching
/// HTTP status code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Unable to authenticate with provided credentials.")]
    BadCredentials,

    #[error("Authentication credentials were not provided.")]
    Unauthorized,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Not found.")]
    NotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Malformed or incomplete JSON bodies surface as 400, not axum's default 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::BadCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                // The cause stays in the logs, never in the response body.
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error." })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

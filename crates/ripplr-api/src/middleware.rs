use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::auth::AppState;
use crate::error::ApiError;

/// The authenticated caller, resolved from an opaque bearer token.
///
/// Handlers that take this extractor reject anonymous requests with 401;
/// public endpoints simply don't ask for it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    /// The presented token, kept so logout can invalidate exactly this one.
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let user = state
            .db
            .get_user_by_token(token)?
            .ok_or(ApiError::Unauthorized)?;

        let id = user
            .id
            .parse()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}'", user.id)))?;

        Ok(CurrentUser {
            id,
            email: user.email,
            token: token.to_string(),
        })
    }
}

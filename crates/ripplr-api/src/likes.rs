use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use ripplr_types::api::{CreateLikeRequest, LikeResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::serialize::like_response;

/// GET /social_media/likes/ — scoped to the caller's own likes.
pub async fn list_likes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_likes_for_user(&user.id.to_string())?;
    Ok(Json(rows.into_iter().map(like_response).collect::<Vec<_>>()))
}

/// POST /social_media/likes/ — no uniqueness: liking the same post twice
/// creates two rows.
pub async fn create_like(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateLikeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    if !state.db.post_exists(&req.post.to_string())? {
        return Err(ApiError::Validation(format!(
            "Invalid post \"{}\" - object does not exist.",
            req.post
        )));
    }

    let like_id = Uuid::new_v4();
    let created_at = Utc::now();

    state.db.insert_like(
        &like_id.to_string(),
        &user.id.to_string(),
        &req.post.to_string(),
        &created_at,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(LikeResponse {
            id: like_id,
            post: req.post,
            user_email: user.email,
            created_at,
        }),
    ))
}

/// DELETE /social_media/likes/{id}/ — another user's like id reads as 404.
pub async fn delete_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_like(&id.to_string(), &user.id.to_string())? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

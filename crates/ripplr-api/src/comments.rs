use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use ripplr_types::api::{CommentCreateResponse, CreateCommentRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::serialize::comment_response;

/// GET /social_media/comments/ — public.
pub async fn list_comments(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_comments()?;
    Ok(Json(
        rows.into_iter().map(comment_response).collect::<Vec<_>>(),
    ))
}

/// POST /social_media/comments/ — the caller becomes the author.
pub async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("This field may not be blank.".into()));
    }
    if !state.db.post_exists(&req.post.to_string())? {
        return Err(ApiError::Validation(format!(
            "Invalid post \"{}\" - object does not exist.",
            req.post
        )));
    }

    let comment_id = Uuid::new_v4();
    let created_at = Utc::now();

    state.db.insert_comment(
        &comment_id.to_string(),
        &user.id.to_string(),
        &req.post.to_string(),
        &req.content,
        &created_at,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CommentCreateResponse {
            id: comment_id,
            post: req.post,
            content: req.content,
            created_at,
        }),
    ))
}

/// DELETE /social_media/comments/{id}/ — owner-or-read-only: anyone may
/// read, only the author may delete.
pub async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .db
        .get_comment(&id.to_string())?
        .ok_or(ApiError::NotFound)?;

    if comment.user_id != user.id.to_string() {
        return Err(ApiError::Forbidden);
    }

    state.db.delete_comment(&id.to_string())?;
    Ok(StatusCode::NO_CONTENT)
}

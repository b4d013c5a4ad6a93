use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use ripplr_types::api::{CreatePostRequest, PostCreateResponse, PostResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::serialize::{post_detail_response, post_response};

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    /// Case-insensitive substring match on post content.
    pub content: Option<String>,
    /// Case-insensitive substring match on the owner's email.
    pub owner: Option<String>,
}

/// GET /social_media/posts/ — public, filterable.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Run the blocking annotated query off the async runtime
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || {
        db.db
            .list_posts(query.content.as_deref(), query.owner.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {e}")))??;

    Ok(Json(collect_posts(rows)))
}

/// POST /social_media/posts/ — the caller becomes the owner, whatever the
/// body claims.
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    if req.content.trim().is_empty() {
        return Err(ApiError::Validation("This field may not be blank.".into()));
    }

    let post_id = Uuid::new_v4();
    let created_at = Utc::now();

    state.db.insert_post(
        &post_id.to_string(),
        &user.id.to_string(),
        &req.content,
        &created_at,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(PostCreateResponse {
            id: post_id,
            content: req.content,
            created_at,
        }),
    ))
}

/// GET /social_media/posts/{id}/ — annotated post plus its comments.
pub async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .get_post(&id.to_string())?
        .ok_or(ApiError::NotFound)?;
    let comments = state.db.list_comments_for_post(&id.to_string())?;

    Ok(Json(post_detail_response(post, comments)))
}

/// GET /social_media/posts/my/
pub async fn own_posts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_own_posts(&user.id.to_string())?;
    Ok(Json(collect_posts(rows)))
}

/// DELETE /social_media/posts/my/{id}/ — someone else's post (or a missing
/// one) is a plain 404.
pub async fn delete_own_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .db
        .delete_own_post(&id.to_string(), &user.id.to_string())?
    {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /social_media/posts/followed/ — posts by authors the caller follows.
pub async fn followed_posts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_followed_posts(&user.id.to_string())?;
    Ok(Json(collect_posts(rows)))
}

/// GET /social_media/posts/liked/ — posts with at least one like from any
/// user (not just the caller; see DESIGN.md).
pub async fn liked_posts(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_liked_posts()?;
    Ok(Json(collect_posts(rows)))
}

fn collect_posts(rows: Vec<ripplr_db::models::PostRow>) -> Vec<PostResponse> {
    rows.into_iter().map(post_response).collect()
}

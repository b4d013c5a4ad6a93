use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use ripplr_types::api::{CreateFollowRequest, FollowCreateResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::serialize::follow_response;

/// GET /social_media/follows/ — edges where the caller is the follower.
pub async fn list_follows(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_follows(&user.id.to_string())?;
    Ok(Json(
        rows.into_iter().map(follow_response).collect::<Vec<_>>(),
    ))
}

/// POST /social_media/follows/ — the caller becomes the follower. Neither
/// self-follows nor duplicate edges are rejected.
pub async fn create_follow(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateFollowRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    if state.db.get_user_by_id(&req.followed.to_string())?.is_none() {
        return Err(ApiError::Validation(format!(
            "Invalid followed \"{}\" - object does not exist.",
            req.followed
        )));
    }

    let follow_id = Uuid::new_v4();
    let created_at = Utc::now();

    state.db.insert_follow(
        &follow_id.to_string(),
        &user.id.to_string(),
        &req.followed.to_string(),
        &created_at,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(FollowCreateResponse {
            id: follow_id,
            follower: user.email,
            followed: req.followed,
            created_at,
        }),
    ))
}

/// DELETE /social_media/follows/{id}/ — scoped to the caller as follower.
pub async fn delete_follow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_follow(&id.to_string(), &user.id.to_string())? {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::Deserialize;

use ripplr_types::api::{ProfileDetailResponse, UpdateProfileRequest};

use crate::auth::{self, AppState};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::serialize::{followed_entry, follower_entry, parse_id, profile_response};

#[derive(Debug, Deserialize)]
pub struct ProfileListQuery {
    /// Case-insensitive substring match on email.
    pub email: Option<String>,
}

/// GET /user/profiles/ — public listing.
pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_profiles(query.email.as_deref())?;
    Ok(Json(
        rows.into_iter().map(profile_response).collect::<Vec<_>>(),
    ))
}

/// GET /user/profile/ — the caller's own profile with both sides of the
/// follow graph.
pub async fn profile_detail(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_user_by_id(&user.id.to_string())?
        .ok_or(ApiError::NotFound)?;

    let followers = state.db.followers_of(&user.id.to_string())?;
    let following = state.db.following_of(&user.id.to_string())?;

    Ok(Json(ProfileDetailResponse {
        id: parse_id(&row.id),
        email: row.email,
        is_staff: row.is_staff,
        profile_image: row.profile_image,
        bio: row.bio,
        followers_count: followers.len(),
        follow_me_list: followers.into_iter().map(follower_entry).collect(),
        follow_him_list: following.into_iter().map(followed_entry).collect(),
    }))
}

/// PATCH /user/profile/ — partial update of the caller's own fields; a
/// supplied password is validated and re-hashed.
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;

    if let Some(email) = req.email.as_deref() {
        auth::validate_email(email)?;
        if let Some(existing) = state.db.get_user_by_email(email)? {
            if existing.id != user.id.to_string() {
                return Err(ApiError::Validation(
                    "user with this email already exists.".into(),
                ));
            }
        }
    }

    let password_hash = match req.password.as_deref() {
        Some(password) => {
            auth::validate_password(password)?;
            Some(auth::hash_password(password)?)
        }
        None => None,
    };

    state.db.update_user(
        &user.id.to_string(),
        req.email.as_deref(),
        password_hash.as_deref(),
        req.profile_image.as_deref(),
        req.bio.as_deref(),
    )?;

    let row = state
        .db
        .get_user_by_id(&user.id.to_string())?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(profile_response(row)))
}

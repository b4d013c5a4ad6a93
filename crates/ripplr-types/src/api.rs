use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

// -- Profiles --

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
}

/// Follow edge pointing at the profile owner: `follow_me_email` is the
/// follower's address.
#[derive(Debug, Serialize)]
pub struct FollowerEntry {
    pub id: Uuid,
    pub follow_me_email: String,
}

/// Follow edge created by the profile owner: `follow_him_email` is the
/// followed user's address.
#[derive(Debug, Serialize)]
pub struct FollowedEntry {
    pub id: Uuid,
    pub follow_him_email: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileDetailResponse {
    pub id: Uuid,
    pub email: String,
    pub is_staff: bool,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub followers_count: usize,
    pub follow_me_list: Vec<FollowerEntry>,
    pub follow_him_list: Vec<FollowedEntry>,
}

/// Partial update: absent fields are left untouched. Password is re-hashed
/// when supplied.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
}

// -- Posts --

/// Unknown fields are deliberately ignored here: the owner is always the
/// authenticated caller, so a client-supplied `user_email` must be dropped
/// rather than rejected.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PostCreateResponse {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub comments_count: i64,
    pub likes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub user_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub comments_count: i64,
    pub likes_count: i64,
    pub comments: Vec<CommentResponse>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post: Uuid,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentCreateResponse {
    pub id: Uuid,
    pub post: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub user_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// -- Likes --

#[derive(Debug, Deserialize)]
pub struct CreateLikeRequest {
    pub post: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub id: Uuid,
    pub post: Uuid,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

// -- Follows --

#[derive(Debug, Deserialize)]
pub struct CreateFollowRequest {
    pub followed: Uuid,
}

/// Create echoes the followed user's id; the list view resolves it to an
/// email address instead.
#[derive(Debug, Serialize)]
pub struct FollowCreateResponse {
    pub id: Uuid,
    pub follower: String,
    pub followed: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub id: Uuid,
    pub follower: String,
    pub followed: String,
    pub created_at: DateTime<Utc>,
}

//! Database row types — these map directly to SQLite rows.
//! Distinct from the ripplr-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// Post annotated with its owner's email and comment/like counts, as every
/// list and detail view renders it.
pub struct PostRow {
    pub id: String,
    pub user_email: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub comments_count: i64,
    pub likes_count: i64,
}

pub struct CommentRow {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub post_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub struct LikeRow {
    pub id: String,
    pub user_email: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}

pub struct FollowRow {
    pub id: String,
    pub follower_email: String,
    pub followed_id: String,
    pub followed_email: String,
    pub created_at: DateTime<Utc>,
}

/// One end of a follow edge, as shown in the profile detail lists.
pub struct FollowPeer {
    pub id: String,
    pub email: String,
}

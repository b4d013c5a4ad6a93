//! Row-to-wire conversion: each list/detail view has its own shape, so the
//! mapping lives here instead of being scattered through the handlers.

use ripplr_db::models::{CommentRow, FollowPeer, FollowRow, LikeRow, PostRow, UserRow};
use ripplr_types::api::{
    CommentResponse, FollowResponse, FollowedEntry, FollowerEntry, LikeResponse,
    PostDetailResponse, PostResponse, ProfileResponse,
};
use tracing::warn;
use uuid::Uuid;

/// Row ids are written as UUIDv4 text by this application; anything else is
/// corruption, logged and mapped to the nil uuid rather than failing the
/// whole listing.
pub(crate) fn parse_id(value: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt row id '{}': {}", value, e);
        Uuid::default()
    })
}

pub(crate) fn post_response(row: PostRow) -> PostResponse {
    PostResponse {
        id: parse_id(&row.id),
        user_email: row.user_email,
        content: row.content,
        created_at: row.created_at,
        comments_count: row.comments_count,
        likes_count: row.likes_count,
    }
}

pub(crate) fn post_detail_response(row: PostRow, comments: Vec<CommentRow>) -> PostDetailResponse {
    PostDetailResponse {
        id: parse_id(&row.id),
        user_email: row.user_email,
        content: row.content,
        created_at: row.created_at,
        comments_count: row.comments_count,
        likes_count: row.likes_count,
        comments: comments.into_iter().map(comment_response).collect(),
    }
}

pub(crate) fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: parse_id(&row.id),
        user_email: row.user_email,
        content: row.content,
        created_at: row.created_at,
    }
}

pub(crate) fn like_response(row: LikeRow) -> LikeResponse {
    LikeResponse {
        id: parse_id(&row.id),
        post: parse_id(&row.post_id),
        user_email: row.user_email,
        created_at: row.created_at,
    }
}

pub(crate) fn follow_response(row: FollowRow) -> FollowResponse {
    FollowResponse {
        id: parse_id(&row.id),
        follower: row.follower_email,
        followed: row.followed_email,
        created_at: row.created_at,
    }
}

pub(crate) fn profile_response(row: UserRow) -> ProfileResponse {
    ProfileResponse {
        id: parse_id(&row.id),
        email: row.email,
        profile_image: row.profile_image,
        bio: row.bio,
    }
}

pub(crate) fn follower_entry(peer: FollowPeer) -> FollowerEntry {
    FollowerEntry {
        id: parse_id(&peer.id),
        follow_me_email: peer.email,
    }
}

pub(crate) fn followed_entry(peer: FollowPeer) -> FollowedEntry {
    FollowedEntry {
        id: parse_id(&peer.id),
        follow_him_email: peer.email,
    }
}

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::auth::{self, AppState};
use crate::{comments, follows, likes, posts, profiles};

/// Full route table. Auth is enforced per handler through the `CurrentUser`
/// extractor, so public and protected methods can share a path.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/user/register/", post(auth::register))
        .route("/user/login/", post(auth::login))
        .route("/user/logout/", post(auth::logout))
        .route(
            "/user/profile/",
            get(profiles::profile_detail).patch(profiles::update_profile),
        )
        .route("/user/profiles/", get(profiles::list_profiles))
        .route(
            "/social_media/posts/",
            get(posts::list_posts).post(posts::create_post),
        )
        .route("/social_media/posts/my/", get(posts::own_posts))
        .route("/social_media/posts/my/{id}/", delete(posts::delete_own_post))
        .route("/social_media/posts/followed/", get(posts::followed_posts))
        .route("/social_media/posts/liked/", get(posts::liked_posts))
        .route("/social_media/posts/{id}/", get(posts::post_detail))
        .route(
            "/social_media/comments/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/social_media/comments/{id}/",
            delete(comments::delete_comment),
        )
        .route(
            "/social_media/likes/",
            get(likes::list_likes).post(likes::create_like),
        )
        .route("/social_media/likes/{id}/", delete(likes::delete_like))
        .route(
            "/social_media/follows/",
            get(follows::list_follows).post(follows::create_follow),
        )
        .route("/social_media/follows/{id}/", delete(follows::delete_follow))
        .with_state(state)
}

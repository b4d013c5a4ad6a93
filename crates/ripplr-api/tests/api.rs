//! End-to-end tests over the full route table, backed by an in-memory
//! SQLite database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use ripplr_api::auth::AppStateInner;
use ripplr_api::routes;

fn app() -> Router {
    let db = ripplr_db::Database::open_in_memory().unwrap();
    routes::router(Arc::new(AppStateInner { db }))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers a user and returns (user_id, token).
async fn register_and_login(app: &Router, email: &str, password: &str) -> (String, String) {
    let (status, registered) = send(
        app,
        "POST",
        "/user/register/",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = registered["id"].as_str().unwrap().to_string();

    let (status, logged_in) = send(
        app,
        "POST",
        "/user/login/",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = logged_in["token"].as_str().unwrap().to_string();

    (user_id, token)
}

async fn create_post(app: &Router, token: &str, content: &str) -> String {
    let (status, created) = send(
        app,
        "POST",
        "/social_media/posts/",
        Some(token),
        Some(json!({ "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_post_and_list_own() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;

    create_post(&app, &token, "hello").await;

    let (status, posts) = send(&app, "GET", "/social_media/posts/my/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["content"], "hello");
    assert_eq!(posts[0]["user_email"], "a@x.com");
    assert_eq!(posts[0]["likes_count"], 0);
    assert_eq!(posts[0]["comments_count"], 0);
}

#[tokio::test]
async fn post_owner_is_never_caller_supplied() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;

    // A spoofed user_email in the body is silently ignored
    let (status, _) = send(
        &app,
        "POST",
        "/social_media/posts/",
        Some(&token),
        Some(json!({ "content": "hello", "user_email": "evil@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, posts) = send(&app, "GET", "/social_media/posts/", None, None).await;
    assert_eq!(posts.as_array().unwrap()[0]["user_email"], "a@x.com");
}

#[tokio::test]
async fn anonymous_callers_are_read_only() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;
    let post_id = create_post(&app, &token, "hello").await;

    let (status, _) = send(&app, "GET", "/social_media/posts/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/social_media/posts/{post_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/social_media/comments/", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/social_media/posts/",
        None,
        Some(json!({ "content": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/social_media/likes/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/comments/{post_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn followed_posts_cover_only_followed_authors() {
    let app = app();
    let (_, token_a) = register_and_login(&app, "a@x.com", "password1").await;
    let (id_b, token_b) = register_and_login(&app, "b@x.com", "password1").await;
    let (_, token_c) = register_and_login(&app, "c@x.com", "password1").await;

    let (status, _) = send(
        &app,
        "POST",
        "/social_media/follows/",
        Some(&token_a),
        Some(json!({ "followed": id_b })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    create_post(&app, &token_b, "from b").await;

    let (_, for_a) = send(
        &app,
        "GET",
        "/social_media/posts/followed/",
        Some(&token_a),
        None,
    )
    .await;
    let for_a = for_a.as_array().unwrap();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0]["user_email"], "b@x.com");

    let (_, for_c) = send(
        &app,
        "GET",
        "/social_media/posts/followed/",
        Some(&token_c),
        None,
    )
    .await;
    assert!(for_c.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn owner_filter_is_case_insensitive_substring() {
    let app = app();
    let (_, admin_token) = register_and_login(&app, "admin@admin.com", "password1").await;
    let (_, alice_token) = register_and_login(&app, "alice@x.com", "password1").await;

    create_post(&app, &admin_token, "admin post").await;
    create_post(&app, &alice_token, "alice post").await;

    let (status, posts) = send(&app, "GET", "/social_media/posts/?owner=ADMIN", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["user_email"], "admin@admin.com");

    let (_, posts) = send(&app, "GET", "/social_media/posts/?content=ALICE", None, None).await;
    assert_eq!(posts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn liking_twice_produces_two_likes() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;
    let post_id = create_post(&app, &token, "hello").await;

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/social_media/likes/",
            Some(&token),
            Some(json!({ "post": post_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, likes) = send(&app, "GET", "/social_media/likes/", Some(&token), None).await;
    assert_eq!(likes.as_array().unwrap().len(), 2);

    let (_, posts) = send(&app, "GET", "/social_media/posts/my/", Some(&token), None).await;
    assert_eq!(posts.as_array().unwrap()[0]["likes_count"], 2);
}

#[tokio::test]
async fn liked_listing_is_not_scoped_to_caller() {
    let app = app();
    let (_, token_a) = register_and_login(&app, "a@x.com", "password1").await;
    let (_, token_b) = register_and_login(&app, "b@x.com", "password1").await;

    let liked = create_post(&app, &token_a, "popular").await;
    create_post(&app, &token_a, "ignored").await;

    let (status, _) = send(
        &app,
        "POST",
        "/social_media/likes/",
        Some(&token_b),
        Some(json!({ "post": liked })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Caller A never liked anything, yet sees the post B liked
    let (_, posts) = send(
        &app,
        "GET",
        "/social_media/posts/liked/",
        Some(&token_a),
        None,
    )
    .await;
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["content"], "popular");
}

#[tokio::test]
async fn only_the_author_may_delete_a_comment() {
    let app = app();
    let (_, token_a) = register_and_login(&app, "a@x.com", "password1").await;
    let (_, token_b) = register_and_login(&app, "b@x.com", "password1").await;
    let post_id = create_post(&app, &token_a, "hello").await;

    let (status, comment) = send(
        &app,
        "POST",
        "/social_media/comments/",
        Some(&token_a),
        Some(json!({ "post": post_id, "content": "nice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/comments/{comment_id}/"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/comments/{comment_id}/"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/comments/{comment_id}/"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, body) = send(&app, "POST", "/user/logout/", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, _) = send(&app, "GET", "/social_media/posts/my/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_detail_shows_both_sides_of_the_graph() {
    let app = app();
    let (id_a, token_a) = register_and_login(&app, "a@x.com", "password1").await;
    let (id_b, token_b) = register_and_login(&app, "b@x.com", "password1").await;
    let (_, token_c) = register_and_login(&app, "c@x.com", "password1").await;

    for token in [&token_b, &token_c] {
        let (status, _) = send(
            &app,
            "POST",
            "/social_media/follows/",
            Some(token),
            Some(json!({ "followed": id_a })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(
        &app,
        "POST",
        "/social_media/follows/",
        Some(&token_a),
        Some(json!({ "followed": id_b })),
    )
    .await;

    let (status, profile) = send(&app, "GET", "/user/profile/", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");
    assert_eq!(profile["is_staff"], false);
    assert_eq!(profile["followers_count"], 2);

    let follower_emails: Vec<&str> = profile["follow_me_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["follow_me_email"].as_str().unwrap())
        .collect();
    assert_eq!(follower_emails, vec!["b@x.com", "c@x.com"]);

    let followed_emails: Vec<&str> = profile["follow_him_list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["follow_him_email"].as_str().unwrap())
        .collect();
    assert_eq!(followed_emails, vec!["b@x.com"]);
}

#[tokio::test]
async fn profile_update_rehashes_password() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, updated) = send(
        &app,
        "PATCH",
        "/user/profile/",
        Some(&token),
        Some(json!({ "password": "password2", "bio": "rustacean" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "rustacean");

    // Old password no longer authenticates
    let (status, _) = send(
        &app,
        "POST",
        "/user/login/",
        None,
        Some(json!({ "email": "a@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/user/login/",
        None,
        Some(json!({ "email": "a@x.com", "password": "password2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn registration_validation() {
    let app = app();

    let (status, _) = send(
        &app,
        "POST",
        "/user/register/",
        None,
        Some(json!({ "email": "a@x.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/user/register/",
        None,
        Some(json!({ "email": "not-an-email", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    register_and_login(&app, "a@x.com", "password1").await;
    let (status, _) = send(
        &app,
        "POST",
        "/user/register/",
        None,
        Some(json!({ "email": "a@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_detail_includes_comments() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;
    let post_id = create_post(&app, &token, "hello").await;

    send(
        &app,
        "POST",
        "/social_media/comments/",
        Some(&token),
        Some(json!({ "post": post_id, "content": "first!" })),
    )
    .await;

    let (status, detail) = send(
        &app,
        "GET",
        &format!("/social_media/posts/{post_id}/"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["comments_count"], 1);

    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "first!");
    assert_eq!(comments[0]["user_email"], "a@x.com");
}

#[tokio::test]
async fn deleting_other_users_resources_is_404() {
    let app = app();
    let (_, token_a) = register_and_login(&app, "a@x.com", "password1").await;
    let (_, token_b) = register_and_login(&app, "b@x.com", "password1").await;
    let post_id = create_post(&app, &token_a, "mine").await;

    let (status, like) = send(
        &app,
        "POST",
        "/social_media/likes/",
        Some(&token_a),
        Some(json!({ "post": post_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let like_id = like["id"].as_str().unwrap();

    // B cannot delete A's post or like; both read as missing
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/posts/my/{post_id}/"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/likes/{like_id}/"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/posts/my/{post_id}/"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn follow_create_and_list_shapes() {
    let app = app();
    let (_, token_a) = register_and_login(&app, "a@x.com", "password1").await;
    let (id_b, _) = register_and_login(&app, "b@x.com", "password1").await;

    let (status, created) = send(
        &app,
        "POST",
        "/social_media/follows/",
        Some(&token_a),
        Some(json!({ "followed": id_b })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["follower"], "a@x.com");
    assert_eq!(created["followed"], id_b);

    let (_, listed) = send(&app, "GET", "/social_media/follows/", Some(&token_a), None).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["follower"], "a@x.com");
    assert_eq!(listed[0]["followed"], "b@x.com");

    // Follow edges of others are invisible and undeletable
    let edge_id = listed[0]["id"].as_str().unwrap();
    let (_, token_b) = {
        let (status, logged_in) = send(
            &app,
            "POST",
            "/user/login/",
            None,
            Some(json!({ "email": "b@x.com", "password": "password1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        (id_b, logged_in["token"].as_str().unwrap().to_string())
    };
    let (_, for_b) = send(&app, "GET", "/social_media/follows/", Some(&token_b), None).await;
    assert!(for_b.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/social_media/follows/{edge_id}/"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_content_is_rejected() {
    let app = app();
    let (_, token) = register_and_login(&app, "a@x.com", "password1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/social_media/posts/",
        Some(&token),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "This field may not be blank.");

    // Malformed body is also a 400, not a 422
    let (status, _) = send(
        &app,
        "POST",
        "/social_media/posts/",
        Some(&token),
        Some(json!({ "not_content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_listing_is_public_and_filterable() {
    let app = app();
    register_and_login(&app, "admin@admin.com", "password1").await;
    register_and_login(&app, "alice@x.com", "password1").await;

    let (status, all) = send(&app, "GET", "/user/profiles/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
    // Password hashes never leak
    assert!(all.as_array().unwrap()[0].get("password").is_none());

    let (_, filtered) = send(&app, "GET", "/user/profiles/?email=admin", None, None).await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["email"], "admin@admin.com");
}

#[tokio::test]
async fn login_with_unknown_or_wrong_credentials_fails() {
    let app = app();
    register_and_login(&app, "a@x.com", "password1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/user/login/",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["detail"],
        "Unable to authenticate with provided credentials."
    );

    let (status, _) = send(
        &app,
        "POST",
        "/user/login/",
        None,
        Some(json!({ "email": "ghost@x.com", "password": "password1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

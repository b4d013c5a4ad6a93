use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            profile_image   TEXT,
            bio             TEXT,
            is_staff        INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS auth_tokens (
            token       TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_posts_user
            ON posts(user_id, created_at);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);

        -- No UNIQUE(user_id, post_id): the same user may like a post twice.
        CREATE TABLE IF NOT EXISTS likes (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_likes_post
            ON likes(post_id);
        CREATE INDEX IF NOT EXISTS idx_likes_user
            ON likes(user_id);

        -- Directed edge: follower_id follows followed_id. Self-follows and
        -- duplicate edges are not constrained.
        CREATE TABLE IF NOT EXISTS follows (
            id           TEXT PRIMARY KEY,
            follower_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            followed_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_follows_follower
            ON follows(follower_id);
        CREATE INDEX IF NOT EXISTS idx_follows_followed
            ON follows(followed_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

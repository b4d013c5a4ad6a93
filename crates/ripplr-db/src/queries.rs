use crate::Database;
use crate::models::{CommentRow, FollowPeer, FollowRow, LikeRow, PostRow, UserRow};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, types::ToSql};

/// Shared SELECT for every post view: owner email plus comment/like counts.
const POST_SELECT: &str = "\
    SELECT p.id, u.email, p.content, p.created_at,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
           (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count
      FROM posts p
      JOIN users u ON p.user_id = u.id";

// Default SQLite row order is unspecified, so every list query orders
// explicitly on (created_at, id) for stable output.
const POST_ORDER: &str = " ORDER BY p.created_at, p.id";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, email, password_hash, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(&format!("{USER_SELECT} WHERE email = ?1"))?
                .query_row([email], map_user_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(&format!("{USER_SELECT} WHERE id = ?1"))?
                .query_row([id], map_user_row)
                .optional()?;
            Ok(row)
        })
    }

    /// Partial profile update: None leaves the column untouched.
    pub fn update_user(
        &self,
        id: &str,
        email: Option<&str>,
        password_hash: Option<&str>,
        profile_image: Option<&str>,
        bio: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET
                     email = COALESCE(?2, email),
                     password = COALESCE(?3, password),
                     profile_image = COALESCE(?4, profile_image),
                     bio = COALESCE(?5, bio)
                 WHERE id = ?1",
                rusqlite::params![id, email, password_hash, profile_image, bio],
            )?;
            Ok(())
        })
    }

    pub fn list_profiles(&self, email: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut sql = USER_SELECT.to_string();
            if email.is_some() {
                sql.push_str(" WHERE lower(email) LIKE '%' || lower(?1) || '%'");
            }
            sql.push_str(" ORDER BY created_at, id");

            let mut stmt = conn.prepare(&sql)?;
            let rows = match email {
                Some(needle) => stmt
                    .query_map([needle], map_user_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?,
                None => stmt
                    .query_map([], map_user_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            };
            Ok(rows)
        })
    }

    /// Foreign keys are ON, so this cascades to the user's posts, comments,
    /// likes, follow edges and tokens.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    // -- Auth tokens --

    pub fn insert_token(&self, token: &str, user_id: &str, created_at: &DateTime<Utc>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![token, user_id, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(
                    "SELECT u.id, u.email, u.password, u.profile_image, u.bio, u.is_staff, u.created_at
                       FROM auth_tokens t
                       JOIN users u ON t.user_id = u.id
                      WHERE t.token = ?1",
                )?
                .query_row([token], map_user_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_token(&self, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM auth_tokens WHERE token = ?1", [token])?;
            Ok(affected > 0)
        })
    }

    // -- Posts --

    pub fn insert_post(
        &self,
        id: &str,
        user_id: &str,
        content: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, user_id, content, created_at],
            )?;
            Ok(())
        })
    }

    /// Main listing with the two optional case-insensitive substring filters.
    pub fn list_posts(&self, content: Option<&str>, owner: Option<&str>) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut sql = POST_SELECT.to_string();
            let mut clauses: Vec<&str> = Vec::new();
            let mut params: Vec<&dyn ToSql> = Vec::new();

            if let Some(needle) = content.as_ref() {
                clauses.push("lower(p.content) LIKE '%' || lower(?) || '%'");
                params.push(needle);
            }
            if let Some(needle) = owner.as_ref() {
                clauses.push("lower(u.email) LIKE '%' || lower(?) || '%'");
                params.push(needle);
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(POST_ORDER);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(&format!("{POST_SELECT} WHERE p.id = ?1"))?
                .query_row([id], map_post_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn post_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool =
                conn.query_row("SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)", [id], |row| {
                    row.get(0)
                })?;
            Ok(exists)
        })
    }

    pub fn list_own_posts(&self, user_id: &str) -> Result<Vec<PostRow>> {
        self.query_posts(&format!("{POST_SELECT} WHERE p.user_id = ?1{POST_ORDER}"), user_id)
    }

    pub fn list_followed_posts(&self, follower_id: &str) -> Result<Vec<PostRow>> {
        self.query_posts(
            &format!(
                "{POST_SELECT} WHERE p.user_id IN
                     (SELECT followed_id FROM follows WHERE follower_id = ?1){POST_ORDER}"
            ),
            follower_id,
        )
    }

    /// Posts with at least one like from anyone. Intentionally not scoped to
    /// a single user; see DESIGN.md.
    pub fn list_liked_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{POST_SELECT} WHERE p.id IN (SELECT post_id FROM likes){POST_ORDER}"
            ))?;
            let rows = stmt
                .query_map([], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete scoped to the owner: someone else's post id counts as missing.
    pub fn delete_own_post(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM posts WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(affected > 0)
        })
    }

    fn query_posts(&self, sql: &str, param: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map([param], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        user_id: &str,
        post_id: &str,
        content: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, user_id, post_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, user_id, post_id, content, created_at],
            )?;
            Ok(())
        })
    }

    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{COMMENT_SELECT} ORDER BY c.created_at, c.id"))?;
            let rows = stmt
                .query_map([], map_comment_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_comments_for_post(&self, post_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.post_id = ?1 ORDER BY c.created_at, c.id"
            ))?;
            let rows = stmt
                .query_map([post_id], map_comment_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(&format!("{COMMENT_SELECT} WHERE c.id = ?1"))?
                .query_row([id], map_comment_row)
                .optional()?;
            Ok(row)
        })
    }

    pub fn delete_comment(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    // -- Likes --

    pub fn insert_like(
        &self,
        id: &str,
        user_id: &str,
        post_id: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO likes (id, user_id, post_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, user_id, post_id, created_at],
            )?;
            Ok(())
        })
    }

    pub fn list_likes_for_user(&self, user_id: &str) -> Result<Vec<LikeRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, u.email, l.post_id, l.created_at
                   FROM likes l
                   JOIN users u ON l.user_id = u.id
                  WHERE l.user_id = ?1
                  ORDER BY l.created_at, l.id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(LikeRow {
                        id: row.get(0)?,
                        user_email: row.get(1)?,
                        post_id: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_like(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM likes WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(affected > 0)
        })
    }

    // -- Follows --

    pub fn insert_follow(
        &self,
        id: &str,
        follower_id: &str,
        followed_id: &str,
        created_at: &DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO follows (id, follower_id, followed_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, follower_id, followed_id, created_at],
            )?;
            Ok(())
        })
    }

    pub fn list_follows(&self, follower_id: &str) -> Result<Vec<FollowRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT f.id, fr.email, f.followed_id, fd.email, f.created_at
                   FROM follows f
                   JOIN users fr ON f.follower_id = fr.id
                   JOIN users fd ON f.followed_id = fd.id
                  WHERE f.follower_id = ?1
                  ORDER BY f.created_at, f.id",
            )?;
            let rows = stmt
                .query_map([follower_id], |row| {
                    Ok(FollowRow {
                        id: row.get(0)?,
                        follower_email: row.get(1)?,
                        followed_id: row.get(2)?,
                        followed_email: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_follow(&self, id: &str, follower_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM follows WHERE id = ?1 AND follower_id = ?2",
                [id, follower_id],
            )?;
            Ok(affected > 0)
        })
    }

    /// Edges pointing at `user_id`; each peer email is the follower's.
    pub fn followers_of(&self, user_id: &str) -> Result<Vec<FollowPeer>> {
        self.query_peers(
            "SELECT f.id, u.email
               FROM follows f
               JOIN users u ON f.follower_id = u.id
              WHERE f.followed_id = ?1
              ORDER BY f.created_at, f.id",
            user_id,
        )
    }

    /// Edges created by `user_id`; each peer email is the followed user's.
    pub fn following_of(&self, user_id: &str) -> Result<Vec<FollowPeer>> {
        self.query_peers(
            "SELECT f.id, u.email
               FROM follows f
               JOIN users u ON f.followed_id = u.id
              WHERE f.follower_id = ?1
              ORDER BY f.created_at, f.id",
            user_id,
        )
    }

    fn query_peers(&self, sql: &str, param: &str) -> Result<Vec<FollowPeer>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map([param], |row| {
                    Ok(FollowPeer {
                        id: row.get(0)?,
                        email: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

const USER_SELECT: &str =
    "SELECT id, email, password, profile_image, bio, is_staff, created_at FROM users";

const COMMENT_SELECT: &str = "\
    SELECT c.id, c.user_id, u.email, c.post_id, c.content, c.created_at
      FROM comments c
      JOIN users u ON c.user_id = u.id";

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        profile_image: row.get(3)?,
        bio: row.get(4)?,
        is_staff: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_post_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        user_email: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
        comments_count: row.get(4)?,
        likes_count: row.get(5)?,
    })
}

fn map_comment_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_email: row.get(2)?,
        post_id: row.get(3)?,
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
}

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rusqlite_migration::{Migrations, M};

use crate::app::{GatorError, Result};
use crate::domain::{
    Feed, FeedFollow, FeedWithOwner, FetchCandidate, InsertOutcome, NewPost, Post, PostWithFeed,
    User,
};
use crate::store::Store;

const NEXT_CANDIDATE_SQL: &str = "SELECT id, name, url FROM feeds
     ORDER BY last_fetched_at IS NOT NULL, last_fetched_at ASC, id ASC
     LIMIT 1";

const FEED_COLUMNS: &str = "id, name, url, user_id, last_fetched_at, created_at, updated_at";

const POST_COLUMNS: &str = "id, title, url, description, published_at, feed_id, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            GatorError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn required_datetime(row: &Row<'_>, idx: usize) -> DateTime<Utc> {
        row.get::<_, String>(idx)
            .ok()
            .and_then(|s| Self::parse_datetime(&s))
            .unwrap_or_else(Utc::now)
    }

    fn optional_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
        Ok(row
            .get::<_, Option<String>>(idx)?
            .and_then(|s| Self::parse_datetime(&s)))
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: Self::required_datetime(row, 2),
            updated_at: Self::required_datetime(row, 3),
        })
    }

    fn feed_from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            user_id: row.get(3)?,
            last_fetched_at: Self::optional_datetime(row, 4)?,
            created_at: Self::required_datetime(row, 5),
            updated_at: Self::required_datetime(row, 6),
        })
    }

    fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<FetchCandidate> {
        Ok(FetchCandidate {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
        })
    }

    fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            description: row.get(3)?,
            published_at: Self::optional_datetime(row, 4)?,
            feed_id: row.get(5)?,
            created_at: Self::required_datetime(row, 6),
        })
    }

    fn insert_feed(conn: &Connection, name: &str, url: &str, user_id: i64) -> Result<Feed> {
        let now = db_time(Utc::now());

        conn.execute(
            "INSERT INTO feeds (name, url, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![name, url, user_id, now],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                GatorError::FeedExists(url.to_string())
            } else {
                e.into()
            }
        })?;

        let feed = conn.query_row(
            &format!("SELECT {} FROM feeds WHERE id = ?1", FEED_COLUMNS),
            params![conn.last_insert_rowid()],
            Self::feed_from_row,
        )?;

        Ok(feed)
    }

    fn insert_follow(conn: &Connection, user_id: i64, feed_id: i64) -> Result<FeedFollow> {
        let now = db_time(Utc::now());

        let inserted = conn.execute(
            "INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            params![user_id, feed_id, now],
        );

        match inserted {
            Ok(_) => Self::follow_by_id(conn, conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => {
                let (user, feed): (String, String) = conn.query_row(
                    "SELECT u.name, f.name FROM users u, feeds f WHERE u.id = ?1 AND f.id = ?2",
                    params![user_id, feed_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Err(GatorError::AlreadyFollowing { user, feed })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn follow_by_id(conn: &Connection, id: i64) -> Result<FeedFollow> {
        let follow = conn.query_row(
            "SELECT ff.id, ff.user_id, ff.feed_id, u.name, f.name, ff.created_at
             FROM feed_follows ff
             JOIN users u ON ff.user_id = u.id
             JOIN feeds f ON ff.feed_id = f.id
             WHERE ff.id = ?1",
            params![id],
            |row| {
                Ok(FeedFollow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    feed_id: row.get(2)?,
                    user_name: row.get(3)?,
                    feed_name: row.get(4)?,
                    created_at: Self::required_datetime(row, 5),
                })
            },
        )?;

        Ok(follow)
    }
}

/// Fixed-width UTC timestamps so that text order matches time order.
fn db_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl Store for SqliteStore {
    fn create_user(&self, name: &str) -> Result<User> {
        let conn = self.conn()?;
        let now = db_time(Utc::now());

        conn.execute(
            "INSERT INTO users (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                GatorError::UserExists(name.to_string())
            } else {
                e.into()
            }
        })?;

        let user = conn.query_row(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?1",
            params![conn.last_insert_rowid()],
            Self::user_from_row,
        )?;

        Ok(user)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn()?;

        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
                params![name],
                Self::user_from_row,
            )
            .optional()?;

        Ok(user)
    }

    fn get_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], Self::user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn delete_all_users(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM users", [])?)
    }

    fn create_feed(&self, name: &str, url: &str, user_id: i64) -> Result<Feed> {
        let conn = self.conn()?;
        Self::insert_feed(&conn, name, url, user_id)
    }

    fn create_feed_and_follow(
        &self,
        name: &str,
        url: &str,
        user_id: i64,
    ) -> Result<(Feed, FeedFollow)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let feed = Self::insert_feed(&tx, name, url, user_id)?;
        let follow = Self::insert_follow(&tx, user_id, feed.id)?;

        tx.commit()?;
        Ok((feed, follow))
    }

    fn get_feed(&self, id: i64) -> Result<Option<Feed>> {
        let conn = self.conn()?;

        let feed = conn
            .query_row(
                &format!("SELECT {} FROM feeds WHERE id = ?1", FEED_COLUMNS),
                params![id],
                Self::feed_from_row,
            )
            .optional()?;

        Ok(feed)
    }

    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let conn = self.conn()?;

        let feed = conn
            .query_row(
                &format!("SELECT {} FROM feeds WHERE url = ?1", FEED_COLUMNS),
                params![url],
                Self::feed_from_row,
            )
            .optional()?;

        Ok(feed)
    }

    fn get_feeds_with_owner(&self) -> Result<Vec<FeedWithOwner>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT f.name, f.url, u.name FROM feeds f
             JOIN users u ON f.user_id = u.id
             ORDER BY f.name, f.url",
        )?;

        let feeds = stmt
            .query_map([], |row| {
                Ok(FeedWithOwner {
                    feed_name: row.get(0)?,
                    feed_url: row.get(1)?,
                    user_name: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }

    fn next_fetch_candidate(&self) -> Result<Option<FetchCandidate>> {
        let conn = self.conn()?;

        let candidate = conn
            .query_row(NEXT_CANDIDATE_SQL, [], Self::candidate_from_row)
            .optional()?;

        Ok(candidate)
    }

    fn mark_feed_fetched(&self, feed_id: i64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "UPDATE feeds SET last_fetched_at = ?1, updated_at = ?1 WHERE id = ?2",
            params![db_time(at), feed_id],
        )?;

        Ok(())
    }

    fn claim_next_feed(&self, at: DateTime<Utc>) -> Result<Option<FetchCandidate>> {
        let mut conn = self.conn()?;

        // IMMEDIATE takes the write lock up front, so another connection on the
        // same file cannot select the same row between our read and update.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let candidate = tx
            .query_row(NEXT_CANDIDATE_SQL, [], Self::candidate_from_row)
            .optional()?;

        if let Some(ref candidate) = candidate {
            tx.execute(
                "UPDATE feeds SET last_fetched_at = ?1, updated_at = ?1 WHERE id = ?2",
                params![db_time(at), candidate.id],
            )?;
        }

        tx.commit()?;
        Ok(candidate)
    }

    fn create_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<FeedFollow> {
        let conn = self.conn()?;
        Self::insert_follow(&conn, user_id, feed_id)
    }

    fn get_feed_follows_for_user(&self, user_id: i64) -> Result<Vec<FeedFollow>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT ff.id, ff.user_id, ff.feed_id, u.name, f.name, ff.created_at
             FROM feed_follows ff
             JOIN users u ON ff.user_id = u.id
             JOIN feeds f ON ff.feed_id = f.id
             WHERE ff.user_id = ?1
             ORDER BY ff.created_at, ff.id",
        )?;

        let follows = stmt
            .query_map(params![user_id], |row| {
                Ok(FeedFollow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    feed_id: row.get(2)?,
                    user_name: row.get(3)?,
                    feed_name: row.get(4)?,
                    created_at: Self::required_datetime(row, 5),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(follows)
    }

    fn delete_feed_follow(&self, user_id: i64, feed_id: i64) -> Result<bool> {
        let conn = self.conn()?;

        let deleted = conn.execute(
            "DELETE FROM feed_follows WHERE user_id = ?1 AND feed_id = ?2",
            params![user_id, feed_id],
        )?;

        Ok(deleted > 0)
    }

    fn insert_post_if_absent(&self, post: &NewPost) -> Result<InsertOutcome> {
        let conn = self.conn()?;
        let now = db_time(Utc::now());

        let inserted = conn.execute(
            "INSERT INTO posts (title, url, description, published_at, feed_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(url) DO NOTHING",
            params![
                post.title,
                post.url,
                post.description,
                post.published_at.map(db_time),
                post.feed_id,
                now
            ],
        )?;

        let stored = conn.query_row(
            &format!("SELECT {} FROM posts WHERE url = ?1", POST_COLUMNS),
            params![post.url],
            Self::post_from_row,
        )?;

        Ok(InsertOutcome {
            inserted: inserted > 0,
            post: stored,
        })
    }

    fn get_post_by_url(&self, url: &str) -> Result<Option<Post>> {
        let conn = self.conn()?;

        let post = conn
            .query_row(
                &format!("SELECT {} FROM posts WHERE url = ?1", POST_COLUMNS),
                params![url],
                Self::post_from_row,
            )
            .optional()?;

        Ok(post)
    }

    fn get_posts_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<PostWithFeed>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT p.id, p.title, p.url, p.description, p.published_at, p.feed_id, p.created_at, f.name
             FROM posts p
             JOIN feeds f ON p.feed_id = f.id
             JOIN feed_follows ff ON ff.feed_id = f.id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at IS NULL, p.published_at DESC, p.created_at DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit)
            .map_err(|_| GatorError::InvalidArgument(format!("limit {} is too large", limit)))?;

        let posts = stmt
            .query_map(params![user_id, limit], |row| {
                Ok(PostWithFeed {
                    post: Self::post_from_row(row)?,
                    feed_name: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(posts)
    }
}

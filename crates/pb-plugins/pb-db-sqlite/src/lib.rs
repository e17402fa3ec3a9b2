//! # pb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `pb-core` domain models. Counter and flag changes are single UPDATE
//! statements, so concurrent views and votes never lose increments.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pb_core::models::{CastOutcome, MemberId, NewPost, NewVote, Post, PostEdit, PostId, Vote, VoteType};
use pb_core::traits::{CommentCounter, PostStore, VoteStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS posts (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id        INTEGER NOT NULL,
        title            TEXT    NOT NULL,
        content          TEXT    NOT NULL,
        image_url        TEXT,
        permit_count     INTEGER NOT NULL DEFAULT 0,
        reject_count     INTEGER NOT NULL DEFAULT 0,
        rank_count       INTEGER NOT NULL DEFAULT 0,
        vote_closed      BOOLEAN NOT NULL DEFAULT 0,
        listing_closed   BOOLEAN NOT NULL DEFAULT 0,
        is_deleted       BOOLEAN NOT NULL DEFAULT 0,
        vote_deadline    TEXT    NOT NULL,
        listing_deadline TEXT    NOT NULL,
        created_at       TEXT    NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_rank ON posts (is_deleted, rank_count DESC, id)",
    "CREATE TABLE IF NOT EXISTS votes (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id  INTEGER NOT NULL,
        post_id    INTEGER NOT NULL REFERENCES posts (id),
        result     TEXT    NOT NULL,
        created_at TEXT    NOT NULL,
        UNIQUE (member_id, post_id)
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id    INTEGER NOT NULL REFERENCES posts (id),
        member_id  INTEGER NOT NULL,
        content    TEXT    NOT NULL,
        created_at TEXT    NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments (post_id)",
];

const POST_COLUMNS: &str = "id, author_id, title, content, image_url, permit_count, reject_count, \
     rank_count, vote_closed, listing_closed, vote_deadline, listing_deadline, created_at";

const VOTE_COLUMNS: &str = "id, member_id, post_id, result, created_at";

/// Backs [`PostStore`], [`VoteStore`] and [`CommentCounter`] with one SQLite database.
pub struct SqliteBoardRepo {
    pool: SqlitePool,
}

impl SqliteBoardRepo {
    /// Connects (creating the database file if needed) and applies the schema.
    ///
    /// `sqlite::memory:` databases live inside a single connection, so the pool
    /// is pinned to one connection that never expires.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(8);
        if url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        tracing::debug!(url, "sqlite schema ready");
        Ok(Self { pool })
    }

    /// Stores a comment. Comments are otherwise managed outside the board core;
    /// this is what seeds [`CommentCounter`].
    pub async fn add_comment(
        &self,
        post: PostId,
        member: MemberId,
        content: &str,
        at: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let row = sqlx::query(
            "INSERT INTO comments (post_id, member_id, content, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(post)
        .bind(member)
        .bind(content)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }
}

fn post_from_row(row: &SqliteRow) -> anyhow::Result<Post> {
    let rank_count: i64 = row.try_get("rank_count")?;
    Ok(Post {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        image_url: row.try_get("image_url")?,
        permit_count: row.try_get("permit_count")?,
        reject_count: row.try_get("reject_count")?,
        rank_count: u64::try_from(rank_count)?,
        vote_closed: row.try_get("vote_closed")?,
        listing_closed: row.try_get("listing_closed")?,
        vote_deadline: row.try_get("vote_deadline")?,
        listing_deadline: row.try_get("listing_deadline")?,
        created_at: row.try_get("created_at")?,
    })
}

fn vote_from_row(row: &SqliteRow) -> anyhow::Result<Vote> {
    let result: String = row.try_get("result")?;
    Ok(Vote {
        id: row.try_get("id")?,
        member_id: row.try_get("member_id")?,
        post_id: row.try_get("post_id")?,
        result: result.parse::<VoteType>()?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl PostStore for SqliteBoardRepo {
    async fn get_by_id(&self, id: PostId) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ? AND is_deleted = 0"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn insert(&self, post: NewPost) -> anyhow::Result<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (author_id, title, content, image_url, vote_deadline, listing_deadline, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.author_id)
        .bind(post.title)
        .bind(post.content)
        .bind(post.image_url)
        .bind(post.vote_deadline)
        .bind(post.listing_deadline)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await?;

        post_from_row(&row)
    }

    async fn update_content(&self, id: PostId, edit: PostEdit) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET title = COALESCE(?, title), content = COALESCE(?, content), image_url = ? \
             WHERE id = ? AND is_deleted = 0 RETURNING {POST_COLUMNS}"
        ))
        .bind(edit.title)
        .bind(edit.content)
        .bind(edit.image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    /// Tombstones the post. Its votes and comments stay behind.
    async fn delete(&self, id: PostId) -> anyhow::Result<bool> {
        let done = sqlx::query("UPDATE posts SET is_deleted = 1 WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE is_deleted = 0 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn list_top_by_engagement(&self, k: usize) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE is_deleted = 0 \
             ORDER BY rank_count DESC, id ASC LIMIT ?"
        ))
        .bind(i64::try_from(k)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    async fn record_view(
        &self,
        id: PostId,
        vote_closed: bool,
        listing_closed: bool,
    ) -> anyhow::Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET rank_count = rank_count + 1, \
             vote_closed = (vote_closed OR ?), listing_closed = (listing_closed OR ?) \
             WHERE id = ? AND is_deleted = 0 RETURNING {POST_COLUMNS}"
        ))
        .bind(vote_closed)
        .bind(listing_closed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn close(&self, id: PostId, vote_closed: bool, listing_closed: bool) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE posts SET vote_closed = (vote_closed OR ?), listing_closed = (listing_closed OR ?) WHERE id = ?",
        )
        .bind(vote_closed)
        .bind(listing_closed)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl VoteStore for SqliteBoardRepo {
    async fn find_by_member_and_post(&self, member: MemberId, post: PostId) -> anyhow::Result<Option<Vote>> {
        let row = sqlx::query(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE member_id = ? AND post_id = ?"
        ))
        .bind(member)
        .bind(post)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(vote_from_row).transpose()
    }

    /// The vote row and the counter bump share one transaction. The UNIQUE
    /// (member_id, post_id) constraint turns a racing second vote into a no-op.
    async fn cast(&self, vote: NewVote) -> anyhow::Result<CastOutcome> {
        // Dropping `tx` without commit rolls back whatever ran inside it.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "INSERT INTO votes (member_id, post_id, result, created_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT (member_id, post_id) DO NOTHING RETURNING {VOTE_COLUMNS}"
        ))
        .bind(vote.member_id)
        .bind(vote.post_id)
        .bind(vote.result.as_str())
        .bind(vote.created_at)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(CastOutcome::AlreadyVoted);
        };
        let stored = vote_from_row(&row)?;

        let counted = match vote.result {
            VoteType::Permit => "permit_count = permit_count + 1",
            VoteType::Reject => "reject_count = reject_count + 1",
            // moves nothing, but still only matches a live post
            VoteType::NoResult => "rank_count = rank_count",
        };
        let row = sqlx::query(&format!(
            "UPDATE posts SET {counted} WHERE id = ? AND is_deleted = 0 RETURNING {POST_COLUMNS}"
        ))
        .bind(vote.post_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            tracing::debug!(post_id = vote.post_id, "vote rolled back, post is gone");
            return Ok(CastOutcome::PostMissing);
        };
        let post = post_from_row(&row)?;

        tx.commit().await?;
        Ok(CastOutcome::Counted { vote: stored, post })
    }
}

#[async_trait]
impl CommentCounter for SqliteBoardRepo {
    async fn count_for(&self, post: PostId) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count)?)
    }
}

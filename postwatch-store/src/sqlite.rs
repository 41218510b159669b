//! SQLite-backed implementation of [`PostStore`].
//!
//! One table, id as the primary key, list columns serialized as JSON text.
//! Writes use `INSERT OR IGNORE` so a replayed fetch can never clobber a
//! stored row.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postwatch_common::{Post, SentimentLabel};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::{PostStore, Saved};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    created_at TEXT,
    content TEXT,
    url TEXT,
    media_urls TEXT,
    replies_count INTEGER,
    reblogs_count INTEGER,
    favourites_count INTEGER,
    sentiment_score REAL,
    sentiment_label TEXT,
    mentioned_tickers TEXT,
    keywords TEXT,
    fetched_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);
CREATE INDEX IF NOT EXISTS idx_posts_mentioned_tickers ON posts(mentioned_tickers);
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database file at `path` and bootstrap
    /// the schema.
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open sqlite database: {path}"))?;

        let store = Self::from_pool(pool);
        store.init_schema().await?;
        info!(db_path = path, "store.connected");
        Ok(store)
    }

    /// Wrap an existing pool (tests use `sqlite::memory:`).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .context("failed to initialise posts schema")?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn has(&self, id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn put(&self, post: &Post) -> Result<Saved> {
        let fetched_at = Utc::now().to_rfc3339();
        let res = sqlx::query(
            r#"INSERT OR IGNORE INTO posts (
                   id, created_at, content, url, media_urls,
                   replies_count, reblogs_count, favourites_count,
                   sentiment_score, sentiment_label, mentioned_tickers, keywords,
                   fetched_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"#,
        )
        .bind(&post.id)
        .bind(&post.created_at)
        .bind(&post.content)
        .bind(&post.url)
        .bind(serde_json::to_string(&post.media_urls)?)
        .bind(post.replies_count)
        .bind(post.reblogs_count)
        .bind(post.favourites_count)
        .bind(post.sentiment_score)
        .bind(post.sentiment_label.as_str())
        .bind(serde_json::to_string(&post.mentioned_tickers)?)
        .bind(serde_json::to_string(&post.keywords)?)
        .bind(fetched_at)
        .execute(&self.pool)
        .await?;

        let saved = if res.rows_affected() > 0 {
            Saved::New
        } else {
            Saved::Seen
        };
        debug!(post_id = %post.id, new = saved.is_new(), "store.put");
        Ok(saved)
    }

    async fn with_ticker(&self, code: Option<&str>) -> Result<Vec<Post>> {
        let rows = match code {
            Some(code) => {
                // Tickers are stored as a JSON array of quoted symbols, so a
                // LIKE over the quoted form matches whole symbols only.
                let pat = format!("%\"{code}\"%");
                sqlx::query(
                    r#"SELECT * FROM posts
                       WHERE mentioned_tickers LIKE ?1
                       ORDER BY created_at DESC"#,
                )
                .bind(pat)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT * FROM posts
                       WHERE mentioned_tickers != '[]'
                       ORDER BY created_at DESC"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        info!(code = code.unwrap_or("*"), rows = rows.len(), "store.with_ticker");
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn fetched_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            r#"SELECT * FROM posts
               WHERE fetched_at > ?1
               ORDER BY created_at DESC"#,
        )
        .bind(cutoff.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        info!(cutoff = %cutoff, rows = rows.len(), "store.fetched_since");
        Ok(rows.iter().map(post_from_row).collect())
    }
}

fn post_from_row(row: &SqliteRow) -> Post {
    Post {
        id: row.try_get::<String, _>("id").unwrap_or_default(),
        created_at: row.try_get::<String, _>("created_at").unwrap_or_default(),
        content: row.try_get::<String, _>("content").unwrap_or_default(),
        url: row.try_get::<String, _>("url").unwrap_or_default(),
        media_urls: json_list(row, "media_urls"),
        replies_count: row.try_get::<i64, _>("replies_count").unwrap_or(0),
        reblogs_count: row.try_get::<i64, _>("reblogs_count").unwrap_or(0),
        favourites_count: row.try_get::<i64, _>("favourites_count").unwrap_or(0),
        sentiment_score: row.try_get::<f64, _>("sentiment_score").unwrap_or(0.0),
        sentiment_label: SentimentLabel::from_str_lossy(
            &row.try_get::<String, _>("sentiment_label").unwrap_or_default(),
        ),
        mentioned_tickers: json_list(row, "mentioned_tickers"),
        keywords: json_list(row, "keywords"),
    }
}

fn json_list(row: &SqliteRow, column: &str) -> Vec<String> {
    row.try_get::<String, _>(column)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

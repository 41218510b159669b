//! Post persistence behind a small repository interface.
//!
//! The pipeline only needs insert-or-ignore semantics plus two read paths
//! (ticker lookup and fetch-time windows), so the trait stays narrow and a
//! [`MemoryStore`] can stand in for SQLite in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postwatch_common::Post;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Outcome of a [`PostStore::put`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    /// The row was inserted; this post was not previously known.
    New,
    /// A row with this id already existed; nothing was written.
    Seen,
}

impl Saved {
    pub fn is_new(self) -> bool {
        matches!(self, Saved::New)
    }
}

/// Repository interface over the single posts table.
///
/// `put` never overwrites: a post already present is left untouched and
/// reported as [`Saved::Seen`]. Reads are ordered by the raw `created_at`
/// string, descending. That ordering is lexicographic and only correct for
/// sources with a sortable timestamp format; it is kept as-is deliberately.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn has(&self, id: &str) -> anyhow::Result<bool>;

    async fn put(&self, post: &Post) -> anyhow::Result<Saved>;

    /// Posts mentioning `code`, or every post with a non-empty ticker list
    /// when `code` is `None`.
    async fn with_ticker(&self, code: Option<&str>) -> anyhow::Result<Vec<Post>>;

    /// Posts whose server-assigned fetch time is after `cutoff`.
    async fn fetched_since(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Post>>;
}

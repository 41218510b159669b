//! In-memory implementation of [`PostStore`] for tests and ephemeral runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postwatch_common::Post;

use crate::{PostStore, Saved};

#[derive(Default)]
pub struct MemoryStore {
    // id -> (post, fetched_at)
    rows: Mutex<BTreeMap<String, (Post, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("memory store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Same ordering contract as the SQLite store: raw `created_at` string,
/// descending.
fn by_created_at_desc(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn has(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self
            .rows
            .lock()
            .expect("memory store poisoned")
            .contains_key(id))
    }

    async fn put(&self, post: &Post) -> anyhow::Result<Saved> {
        let mut rows = self.rows.lock().expect("memory store poisoned");
        if rows.contains_key(&post.id) {
            return Ok(Saved::Seen);
        }
        rows.insert(post.id.clone(), (post.clone(), Utc::now()));
        Ok(Saved::New)
    }

    async fn with_ticker(&self, code: Option<&str>) -> anyhow::Result<Vec<Post>> {
        let rows = self.rows.lock().expect("memory store poisoned");
        let matching = rows
            .values()
            .filter(|(p, _)| match code {
                Some(code) => p.mentioned_tickers.iter().any(|t| t == code),
                None => !p.mentioned_tickers.is_empty(),
            })
            .map(|(p, _)| p.clone())
            .collect();
        Ok(by_created_at_desc(matching))
    }

    async fn fetched_since(&self, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Post>> {
        let rows = self.rows.lock().expect("memory store poisoned");
        let matching = rows
            .values()
            .filter(|(_, fetched_at)| *fetched_at > cutoff)
            .map(|(p, _)| p.clone())
            .collect();
        Ok(by_created_at_desc(matching))
    }
}

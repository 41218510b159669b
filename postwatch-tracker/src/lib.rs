//! Pipeline orchestration: fetch → analyze → persist → notify.
//!
//! A [`Tracker`] owns the fetcher, the candidate source list, and a handle
//! to the store. It runs the pipeline once per call; daemon mode repeats it
//! on a fixed interval until the cancellation token fires. Every failure
//! inside one iteration degrades (empty fetch, post treated as seen) with
//! detail in the logs; only cancellation ends the loop.

use std::sync::Arc;
use std::time::Duration;

use postwatch_common::Post;
use postwatch_feed::{FeedFetcher, FeedSource};
use postwatch_store::PostStore;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod report;

/// What one pipeline run saw and did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Items the winning source yielded (before dedup).
    pub fetched: usize,
    /// Posts not previously present in the store, analyzer output applied.
    pub new_posts: Vec<Post>,
    /// Posts that failed to persist this run (degraded to "not new").
    pub save_failures: usize,
}

pub struct Tracker {
    fetcher: FeedFetcher,
    sources: Vec<FeedSource>,
    store: Arc<dyn PostStore>,
}

impl Tracker {
    pub fn new(fetcher: FeedFetcher, sources: Vec<FeedSource>, store: Arc<dyn PostStore>) -> Self {
        Self {
            fetcher,
            sources,
            store,
        }
    }

    /// One full pipeline pass: fetch, then sequentially analyze and persist
    /// each post, collecting the ones the store reports as new.
    ///
    /// A pass in which no source yields anything is not an error; it
    /// simply produces an empty summary.
    pub async fn run_once(&self) -> RunSummary {
        let posts = self.fetcher.fetch_posts(&self.sources).await;
        let fetched = posts.len();
        let mut summary = self.ingest(posts).await;
        summary.fetched = fetched;

        info!(
            fetched = summary.fetched,
            new = summary.new_posts.len(),
            save_failures = summary.save_failures,
            "tracker.run_once"
        );
        summary
    }

    /// Analyze and persist a batch, one post at a time.
    ///
    /// A persistence error is logged and the post treated as already seen;
    /// it never aborts the batch. New posts with ticker mentions are
    /// flagged for downstream notification (log-only).
    pub async fn ingest(&self, posts: Vec<Post>) -> RunSummary {
        let mut summary = RunSummary::default();

        for mut post in posts {
            postwatch_analyze::enrich(&mut post);

            let saved = match self.store.put(&post).await {
                Ok(saved) => saved,
                Err(err) => {
                    warn!(post_id = %post.id, error = %err, "tracker.save_failed");
                    summary.save_failures += 1;
                    continue;
                }
            };

            if saved.is_new() {
                if !post.mentioned_tickers.is_empty() {
                    info!(
                        post_id = %post.id,
                        tickers = ?post.mentioned_tickers,
                        excerpt = %excerpt(&post.content, 100),
                        "tracker.ticker_mention"
                    );
                }
                summary.new_posts.push(post);
            }
        }

        summary
    }

    /// Repeat [`Tracker::run_once`] every `interval` until `cancel` fires.
    ///
    /// An empty pass (every source down or silent) is logged like any
    /// other and waits the same interval. Cancellation wins the wait and
    /// exits the loop cleanly.
    pub async fn run_daemon(&self, interval: Duration, cancel: CancellationToken) {
        info!(interval_secs = interval.as_secs(), "tracker.daemon.start");

        loop {
            let summary = self.run_once().await;
            if summary.new_posts.is_empty() {
                info!("tracker.daemon.no_new_posts");
            } else {
                info!(new = summary.new_posts.len(), "tracker.daemon.new_posts");
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(interval) => {}
            }
        }

        info!("tracker.daemon.stopped");
    }
}

/// Char-safe prefix with a trailing ellipsis when truncated.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max_chars).collect();
    s.push_str("...");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use postwatch_store::MemoryStore;

    fn tracker_with_memory_store() -> (Tracker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let fetcher =
            FeedFetcher::new(Duration::from_secs(1), 40).expect("fetcher builds offline");
        let tracker = Tracker::new(fetcher, Vec::new(), store.clone());
        (tracker, store)
    }

    fn feed_post(id: &str, content: &str) -> Post {
        let mut p = Post::new(id.into());
        p.content = content.into();
        p.created_at = format!("2026-08-29 {id}");
        p
    }

    #[tokio::test]
    async fn ingest_analyzes_and_stores_new_posts() {
        let (tracker, store) = tracker_with_memory_store();

        let summary = tracker
            .ingest(vec![feed_post("p-1", "Great win for $TSLA today")])
            .await;

        assert_eq!(summary.new_posts.len(), 1);
        assert_eq!(summary.save_failures, 0);
        let stored = &summary.new_posts[0];
        assert_eq!(stored.mentioned_tickers, vec!["TSLA"]);
        assert_eq!(
            stored.sentiment_label,
            postwatch_common::SentimentLabel::Positive
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn ingest_reports_only_unseen_posts() {
        let (tracker, store) = tracker_with_memory_store();

        let first = tracker
            .ingest(vec![feed_post("p-1", "one"), feed_post("p-2", "two")])
            .await;
        assert_eq!(first.new_posts.len(), 2);

        // Second run re-fetches an overlapping window.
        let second = tracker
            .ingest(vec![feed_post("p-2", "two"), feed_post("p-3", "three")])
            .await;
        let ids: Vec<_> = second.new_posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-3"]);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_within_one_batch_counts_once() {
        let (tracker, _store) = tracker_with_memory_store();

        let summary = tracker
            .ingest(vec![feed_post("p-1", "one"), feed_post("p-1", "one")])
            .await;
        assert_eq!(summary.new_posts.len(), 1);
    }

    #[tokio::test]
    async fn total_source_failure_yields_empty_summary() {
        let store = Arc::new(MemoryStore::new());
        let fetcher =
            FeedFetcher::new(Duration::from_millis(200), 40).expect("fetcher builds offline");
        // Discard port; the connection is refused immediately.
        let sources = vec![FeedSource::new("dead", "http://127.0.0.1:9/feed")];
        let tracker = Tracker::new(fetcher, sources, store.clone());

        let summary = tracker.run_once().await;
        assert_eq!(summary.fetched, 0);
        assert!(summary.new_posts.is_empty());
        assert_eq!(summary.save_failures, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn excerpt_is_char_safe() {
        assert_eq!(excerpt("short", 100), "short");
        let long = "x".repeat(150);
        let cut = excerpt(&long, 100);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));
        // Multi-byte content must not split a char.
        let emoji = "📈".repeat(60);
        let cut = excerpt(&emoji, 50);
        assert!(cut.ends_with("..."));
    }
}

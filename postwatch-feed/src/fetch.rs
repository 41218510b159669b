//! First-success fetch loop over the candidate sources.

use std::time::Duration;

use postwatch_common::Post;
use postwatch_http::{HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{info, warn};

use crate::parse::posts_from_channel;
use crate::sources::FeedSource;

/// Some mirrors reject clients without a browser-looking user agent.
const FEED_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct FeedFetcher {
    http: HttpClient,
    timeout: Duration,
    limit: usize,
}

impl FeedFetcher {
    pub fn new(timeout: Duration, limit: usize) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new()?,
            timeout,
            limit,
        })
    }

    /// Try each source in order; the first one yielding at least one
    /// parseable item wins and later sources are not contacted.
    ///
    /// Network errors and unparseable documents are logged and skipped.
    /// Retrying happens only at the daemon-iteration granularity, so each
    /// source gets exactly one timed GET. On total failure the result is
    /// simply empty; no error reaches the caller.
    pub async fn fetch_posts(&self, sources: &[FeedSource]) -> Vec<Post> {
        for source in sources {
            info!(source = %source.name, url = %source.url, "feed.fetch.try_source");

            let body = match self.get_feed(&source.url).await {
                Ok(body) => body,
                Err(err) => {
                    warn!(source = %source.name, error = %err, "feed.fetch.source_failed");
                    continue;
                }
            };

            let channel = match rss::Channel::read_from(&body[..]) {
                Ok(channel) => channel,
                Err(err) => {
                    warn!(source = %source.name, error = %err, "feed.fetch.not_rss");
                    continue;
                }
            };

            let mut posts = posts_from_channel(&channel);
            if posts.is_empty() {
                warn!(source = %source.name, "feed.fetch.zero_items");
                continue;
            }

            posts.truncate(self.limit);
            info!(
                source = %source.name,
                count = posts.len(),
                "feed.fetch.source_succeeded"
            );
            return posts;
        }

        warn!("feed.fetch.all_sources_failed");
        Vec::new()
    }

    async fn get_feed(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(FEED_USER_AGENT));

        self.http
            .get_bytes(
                url,
                RequestOpts {
                    timeout: Some(self.timeout),
                    retries: Some(0),
                    headers: Some(headers),
                },
            )
            .await
    }
}

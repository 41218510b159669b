//! Common types and utilities shared across Postwatch crates.
//!
//! This crate defines the post data model and observability helpers used
//! throughout the Postwatch workspace. It is intentionally
//! lightweight and dependency‑minimal so that all crates can depend on it
//! without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`Post`]: The canonical record flowing through the pipeline
//! - [`SentimentLabel`]: Three-way sentiment classification
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! Constructing a bare post:
//!
//! ```rust
//! use postwatch_common::{Post, SentimentLabel};
//!
//! let post = Post::new("114200000000000001".into());
//! assert_eq!(post.sentiment_label, SentimentLabel::Neutral);
//! assert!(post.mentioned_tickers.is_empty());
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Three-way sentiment classification attached to every analyzed post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// Stable string form used in the store and in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "positive" => SentimentLabel::Positive,
            "negative" => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }
}

/// A single post from the tracked feed.
///
/// Built by the parser, enriched exactly once by the analyzer before first
/// persistence, immutable thereafter. `id` is the natural key; the store
/// never overwrites an existing row for the same id.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Post {
    /// Source-assigned identifier (feed `guid`, or a hash of the link).
    pub id: String,
    /// Raw source timestamp (`pubDate`), deliberately not normalized.
    pub created_at: String,
    pub content: String,
    pub url: String,
    /// Always empty in the feed path; the source format carries no media.
    pub media_urls: Vec<String>,
    pub replies_count: i64,
    pub reblogs_count: i64,
    pub favourites_count: i64,
    /// Derived score in [-1, 1].
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    /// Deduplicated ticker symbols mentioned in the content.
    pub mentioned_tickers: Vec<String>,
    /// Up to 10 extracted keywords, insertion order.
    pub keywords: Vec<String>,
}

impl Post {
    pub fn new(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

//! Keyword-based text heuristics for post content.
//!
//! This module provides the sentiment label/score, ticker extraction, and
//! keyword extraction applied to every post before it is persisted. These
//! are deliberately crude lexicon heuristics, not NLP: the keyword sets,
//! tie-break rule, and score clamps are contractual constants that
//! downstream consumers (store queries, reports) rely on.
//!
//! # Example
//! ```rust
//! use postwatch_analyze::{sentiment, extract_tickers};
//! use postwatch_common::SentimentLabel;
//!
//! let (score, label) = sentiment("Great news for $TSLA, best earnings ever!");
//! assert_eq!(label, SentimentLabel::Positive);
//! assert!(score > 0.5);
//! assert_eq!(extract_tickers("buy $TSLA"), vec!["TSLA"]);
//! ```

use std::collections::BTreeSet;
use std::sync::LazyLock;

use postwatch_common::{Post, SentimentLabel};
use regex::Regex;

/// Lexicon counted toward a positive label. Matched as case-insensitive
/// substrings, each entry at most once per post.
const POSITIVE_WORDS: &[&str] = &[
    "great",
    "good",
    "excellent",
    "amazing",
    "fantastic",
    "wonderful",
    "best",
    "win",
    "winning",
    "success",
    "successful",
    "love",
    "like",
    "happy",
    "congratulations",
    "thank",
    "thanks",
];

/// Lexicon counted toward a negative label.
const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "worst",
    "fail",
    "failure",
    "hate",
    "dislike",
    "sad",
    "angry",
    "disappointed",
    "wrong",
    "fake",
    "lie",
    "lies",
    "stupid",
    "dumb",
];

/// Matches `$TSLA` / `#TSLA` style ticker mentions.
static TICKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$#]([A-Z]{1,5})").expect("ticker pattern compiles"));

const MAX_KEYWORDS: usize = 10;

/// Score and label the text from the two fixed lexicons.
///
/// The score is `0.5 + 0.1` per surplus positive hit (clamped to `1.0`),
/// mirrored for negative, and exactly `0.0` on a tie.
pub fn sentiment(text: &str) -> (f64, SentimentLabel) {
    let lowered = text.to_lowercase();
    let pos = POSITIVE_WORDS
        .iter()
        .filter(|w| lowered.contains(*w))
        .count() as i64;
    let neg = NEGATIVE_WORDS
        .iter()
        .filter(|w| lowered.contains(*w))
        .count() as i64;

    if pos > neg {
        let score = (0.5 + 0.1 * (pos - neg) as f64).min(1.0);
        (score, SentimentLabel::Positive)
    } else if neg > pos {
        let score = (-0.5 - 0.1 * (neg - pos) as f64).max(-1.0);
        (score, SentimentLabel::Negative)
    } else {
        (0.0, SentimentLabel::Neutral)
    }
}

/// Collect `$`/`#`-prefixed uppercase symbols, deduplicated.
///
/// Order is unspecified by contract; the implementation returns symbols
/// sorted so results are stable across runs.
pub fn extract_tickers(text: &str) -> Vec<String> {
    let set: BTreeSet<String> = TICKER_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect();
    set.into_iter().collect()
}

/// First 10 whitespace-split tokens that are longer than 4 characters and
/// purely alphabetic, original order. No stopword filtering, no stemming.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.chars().count() > 4 && w.chars().all(|c| c.is_alphabetic()))
        .take(MAX_KEYWORDS)
        .map(|w| w.to_string())
        .collect()
}

/// Apply all three heuristics to a post in place.
///
/// Called exactly once per post, after parsing and before persistence.
pub fn enrich(post: &mut Post) {
    let (score, label) = sentiment(&post.content);
    post.sentiment_score = score;
    post.sentiment_label = label;
    post.mentioned_tickers = extract_tickers(&post.content);
    post.keywords = extract_keywords(&post.content);

    tracing::trace!(
        post_id = %post.id,
        label = label.as_str(),
        score,
        tickers = post.mentioned_tickers.len(),
        "analyze.enrich"
    );
}

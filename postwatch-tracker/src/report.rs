//! Text rendering over store query results. Pure formatting, no I/O.

use std::collections::BTreeSet;

use postwatch_common::{Post, SentimentLabel};

use crate::excerpt;

const REPORT_POST_LIMIT: usize = 5;
const REPORT_EXCERPT_CHARS: usize = 100;
const LOOKUP_EXCERPT_CHARS: usize = 200;

fn glyph(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "😊",
        SentimentLabel::Negative => "😠",
        SentimentLabel::Neutral => "😐",
    }
}

/// Summary block for an hour window: post count, distinct tickers, and up
/// to five most recent posts. `posts` is expected in the store's ordering
/// (created_at descending).
pub fn render_report(posts: &[Post], hours: i64) -> String {
    if posts.is_empty() {
        return format!("No new posts in the past {hours} hours");
    }

    let mut lines = Vec::new();
    lines.push(format!("\n📊 Postwatch report (past {hours} hours)"));
    lines.push("=".repeat(60));
    lines.push(format!("New posts: {}", posts.len()));

    let tickers: BTreeSet<&str> = posts
        .iter()
        .flat_map(|p| p.mentioned_tickers.iter().map(String::as_str))
        .collect();
    if !tickers.is_empty() {
        let joined = tickers.into_iter().collect::<Vec<_>>().join(", ");
        lines.push(format!("\n📈 Tickers mentioned: {joined}"));
    }

    lines.push("\n📝 Latest posts:".to_string());
    for post in posts.iter().take(REPORT_POST_LIMIT) {
        lines.push(format!(
            "\n{} {}",
            glyph(post.sentiment_label),
            excerpt(&post.content, REPORT_EXCERPT_CHARS)
        ));
        lines.push(format!("   🔗 {}", post.url));
    }

    lines.join("\n")
}

/// Listing for a ticker lookup: timestamp, excerpt, and link per post.
pub fn render_ticker_posts(code: &str, posts: &[Post]) -> String {
    let mut lines = Vec::new();
    lines.push(format!("\n📈 Posts mentioning {code} ({}):", posts.len()));
    for post in posts {
        lines.push(format!("\n{}", post.created_at));
        lines.push(excerpt(&post.content, LOOKUP_EXCERPT_CHARS));
        lines.push(format!("🔗 {}", post.url));
    }
    lines.join("\n")
}

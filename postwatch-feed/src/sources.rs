//! Candidate feed endpoints for a tracked handle, priority order.

/// One syndication endpoint that may expose the tracked account's posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// Short label used in logs.
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Build the ordered candidate list for `handle`.
///
/// When `overrides` is non-empty it wins verbatim (labels derived from the
/// URL host); otherwise the default mirrors are tried: the RSSHub user feed
/// first, then the dedicated third-party mirror.
pub fn candidates(handle: &str, overrides: &[String]) -> Vec<FeedSource> {
    if !overrides.is_empty() {
        return overrides
            .iter()
            .map(|url| FeedSource::new(host_label(url), url.clone()))
            .collect();
    }

    vec![
        FeedSource::new(
            "rsshub",
            format!("https://rsshub.app/truthsocial/user/{handle}"),
        ),
        FeedSource::new("trumpstruth", "https://trumpstruth.org/feed"),
    ]
}

fn host_label(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or("source")
        .to_string()
}

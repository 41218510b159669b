//! Conversion from raw RSS items into [`Post`] records.
//!
//! One malformed item never aborts the batch: items are converted
//! individually and failures are logged and skipped.

use postwatch_common::Post;
use tracing::warn;

/// Convert a whole channel, skipping items that cannot be converted.
///
/// The returned order is the document order of the feed (which sources emit
/// newest-first); nothing is re-sorted here.
pub fn posts_from_channel(channel: &rss::Channel) -> Vec<Post> {
    let mut posts = Vec::new();
    for item in channel.items() {
        match post_from_item(item) {
            Some(post) => posts.push(post),
            None => {
                warn!(
                    title = item.title().unwrap_or(""),
                    "feed.parse.item_skipped"
                );
            }
        }
    }
    posts
}

/// Convert a single item. Returns `None` for malformed items: those with
/// neither a `guid` nor a `link`, since no stable identifier can be formed.
///
/// Absent optional fields default to the empty string. The body is the
/// item description, falling back to the title. The feed format carries no
/// media, so `media_urls` stays empty and engagement counters stay zero.
pub fn post_from_item(item: &rss::Item) -> Option<Post> {
    let link = item.link().unwrap_or("");
    let id = match item.guid() {
        Some(guid) if !guid.value().is_empty() => guid.value().to_string(),
        _ if !link.is_empty() => link_id(link),
        _ => return None,
    };

    let title = item.title().unwrap_or("");
    let content = item.description().unwrap_or(title);

    let mut post = Post::new(id);
    post.created_at = item.pub_date().unwrap_or("").to_string();
    post.content = content.to_string();
    post.url = link.to_string();
    Some(post)
}

/// Stable identifier for guid-less items: hex blake3 of the link.
fn link_id(link: &str) -> String {
    hex::encode(&blake3::hash(link.as_bytes()).as_bytes()[..16])
}

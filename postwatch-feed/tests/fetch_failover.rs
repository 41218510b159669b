use std::time::Duration;

use postwatch_feed::sources::FeedSource;
use postwatch_feed::FeedFetcher;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TWO_ITEM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>mirror</title>
    <link>https://mirror.example</link>
    <description>posts</description>
    <item>
      <guid>a-1</guid>
      <title>Alpha</title>
      <link>https://mirror.example/a-1</link>
      <pubDate>Sat, 29 Aug 2026 10:00:00 GMT</pubDate>
      <description>Alpha body</description>
    </item>
    <item>
      <guid>a-2</guid>
      <title>Beta</title>
      <link>https://mirror.example/a-2</link>
      <pubDate>Sat, 29 Aug 2026 09:00:00 GMT</pubDate>
      <description>Beta body</description>
    </item>
  </channel>
</rss>"#;

const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>empty</title>
    <link>https://empty.example</link>
    <description>nothing</description>
  </channel>
</rss>"#;

async fn feed_mock(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/rss+xml"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn slow_first_source_fails_over_to_second() {
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(TWO_ITEM_FEED, "application/rss+xml")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&slow)
        .await;

    let good = feed_mock(TWO_ITEM_FEED).await;

    let sources = vec![
        FeedSource::new("slow", format!("{}/feed", slow.uri())),
        FeedSource::new("good", format!("{}/feed", good.uri())),
    ];

    let fetcher = FeedFetcher::new(Duration::from_millis(300), 40).expect("fetcher builds");
    let posts = fetcher.fetch_posts(&sources).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "a-1");
    assert_eq!(posts[1].id, "a-2");
}

#[tokio::test]
async fn erroring_first_source_fails_over_to_second() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let good = feed_mock(TWO_ITEM_FEED).await;

    let sources = vec![
        FeedSource::new("broken", format!("{}/feed", broken.uri())),
        FeedSource::new("good", format!("{}/feed", good.uri())),
    ];

    let fetcher = FeedFetcher::new(Duration::from_secs(5), 40).expect("fetcher builds");
    let posts = fetcher.fetch_posts(&sources).await;
    assert_eq!(posts.len(), 2);
}

#[tokio::test]
async fn zero_item_source_does_not_win() {
    let empty = feed_mock(EMPTY_FEED).await;
    let good = feed_mock(TWO_ITEM_FEED).await;

    let sources = vec![
        FeedSource::new("empty", format!("{}/feed", empty.uri())),
        FeedSource::new("good", format!("{}/feed", good.uri())),
    ];

    let fetcher = FeedFetcher::new(Duration::from_secs(5), 40).expect("fetcher builds");
    let posts = fetcher.fetch_posts(&sources).await;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "a-1");
}

#[tokio::test]
async fn total_failure_yields_empty_not_error() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    let sources = vec![FeedSource::new("broken", format!("{}/feed", broken.uri()))];

    let fetcher = FeedFetcher::new(Duration::from_secs(5), 40).expect("fetcher builds");
    let posts = fetcher.fetch_posts(&sources).await;
    assert!(posts.is_empty());
}

#[tokio::test]
async fn fetch_limit_truncates_the_winning_feed() {
    let good = feed_mock(TWO_ITEM_FEED).await;
    let sources = vec![FeedSource::new("good", format!("{}/feed", good.uri()))];

    let fetcher = FeedFetcher::new(Duration::from_secs(5), 1).expect("fetcher builds");
    let posts = fetcher.fetch_posts(&sources).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "a-1");
}

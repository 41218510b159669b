use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use postwatch_common::observability::{init_logging, LogConfig, LogFormat};
use postwatch_common::Post;
use postwatch_config::{PostwatchConfigLoader, TrackerSpec};
use postwatch_feed::{sources, FeedFetcher};
use postwatch_store::{PostStore, SqliteStore};
use postwatch_tracker::report::{render_report, render_ticker_posts};
use postwatch_tracker::{excerpt, Tracker};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Parser)]
#[command(name = "postwatch", about = "Track, analyze, and report posts from a public feed")]
struct Cli {
    /// Configuration file; defaults apply when it is missing.
    #[arg(long, default_value = "postwatch.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// One-shot pipeline run (the default).
    Run,
    /// Keep polling on a fixed interval until interrupted.
    Daemon {
        /// Seconds between polls; overrides the configured value.
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Summarise posts fetched inside an hour window.
    Report {
        #[arg(long)]
        hours: Option<i64>,
    },
    /// List stored posts mentioning a ticker symbol.
    Ticker { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins), then logging.
    let cfg = PostwatchConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    let format = std::env::var("POSTWATCH_LOG_FORMAT")
        .map(|v| LogFormat::from_env_value(&v))
        .unwrap_or(LogFormat::Text);
    init_logging(LogConfig {
        emit_stderr: true,
        format,
        ..LogConfig::default()
    })?;

    let spec = cfg.tracker;
    let store = Arc::new(SqliteStore::connect(&spec.db_path).await?);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let tracker = build_tracker(&spec, store.clone())?;
            let summary = tracker.run_once().await;
            print_new_posts(&summary.new_posts);
        }
        Command::Daemon { interval } => {
            let tracker = build_tracker(&spec, store.clone())?;
            let interval = Duration::from_secs(interval.unwrap_or(spec.interval_secs));

            let cancel = CancellationToken::new();
            let handle = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.cancel();
                }
            });

            tracker.run_daemon(interval, cancel).await;
        }
        Command::Report { hours } => {
            let hours = hours.unwrap_or(spec.report_hours);
            let cutoff = chrono::Utc::now() - chrono::Duration::hours(hours);
            let posts = store.fetched_since(cutoff).await.unwrap_or_else(|err| {
                warn!(error = %err, "app.report.query_failed");
                Vec::new()
            });
            println!("{}", render_report(&posts, hours));
        }
        Command::Ticker { code } => {
            let posts = store.with_ticker(Some(&code)).await.unwrap_or_else(|err| {
                warn!(error = %err, "app.ticker.query_failed");
                Vec::new()
            });
            println!("{}", render_ticker_posts(&code, &posts));
        }
    }

    Ok(())
}

fn build_tracker(spec: &TrackerSpec, store: Arc<SqliteStore>) -> Result<Tracker> {
    let fetcher = FeedFetcher::new(
        Duration::from_secs(spec.http_timeout_secs),
        spec.fetch_limit,
    )?;
    let candidates = sources::candidates(&spec.handle, &spec.sources);
    Ok(Tracker::new(fetcher, candidates, store))
}

fn print_new_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("\nℹ️ No new posts");
        return;
    }

    println!("\n✅ {} new post(s)", posts.len());
    for post in posts {
        println!("\n📅 {}", post.created_at);
        println!("📝 {}", excerpt(&post.content, 150));
        println!(
            "😊 Sentiment: {} ({:+.2})",
            post.sentiment_label.as_str(),
            post.sentiment_score
        );
        if !post.mentioned_tickers.is_empty() {
            println!("📈 Tickers: {}", post.mentioned_tickers.join(", "));
        }
        println!("🔗 {}", post.url);
    }
}

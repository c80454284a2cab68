// src/main.rs

use std::sync::Arc;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pagefeed::feed::FeedAggregator;
use pagefeed::fetcher::http::HttpPageFetcher;
use pagefeed::{FeedConfig, FeedState, QueryParams};

/// Drive a cursor-paginated feed endpoint until it is exhausted,
/// printing each aggregation step.
#[derive(Parser)]
#[command(name = "pagefeed", version)]
struct Args {
    /// Feed endpoint to POST page requests to
    #[arg(long, env = "PAGEFEED_ENDPOINT")]
    endpoint: String,

    /// Sort criteria forwarded to the remote (e.g. LATEST, TOP_COMMENTED)
    #[arg(long, default_value = "TOP_COMMENTED")]
    sort: String,

    /// Viewer profile id, for reaction resolution on the remote
    #[arg(long)]
    viewer: Option<String>,

    /// Stop after this many pages even if more remain
    #[arg(long, default_value_t = 50)]
    max_pages: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    let config = FeedConfig::from_env();

    // Initialize tracing
    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting pagefeed driver");
    info!("Endpoint: {}", args.endpoint);
    info!("Sort: {} PageSize: {}", args.sort, config.page_size);

    let fetcher = Arc::new(HttpPageFetcher::new(&args.endpoint, &config));
    let feed = FeedAggregator::new(fetcher, &config);

    let mut params = QueryParams::sorted_by(args.sort);
    params.viewer = args.viewer;
    feed.on_params_changed(params).await;

    let mut pages = 1u32;
    loop {
        let snapshot = feed.snapshot();
        let keep_going = matches!(snapshot.state, FeedState::Content { has_more: true })
            && snapshot.notice.is_none()
            && pages < args.max_pages;
        if !keep_going {
            info!(
                state = ?snapshot.state,
                items = snapshot.items.len(),
                total = ?snapshot.total_count,
                pages,
                "Feed settled"
            );
            if let Some(notice) = snapshot.notice {
                info!("Stopped on incremental fetch failure: {}", notice);
            }
            for (index, item) in snapshot.items.iter().enumerate() {
                println!("{:>4}  {:?}  {}", index, item.kind, item.id);
            }
            break;
        }
        // Simulate the sentinel scrolling into view.
        feed.on_sentinel_visible().await;
        pages += 1;
    }

    Ok(())
}

//! Drives the all-trades feed through an external reactive filter source,
//! the way a trades page updates its coin filter.

use std::time::Duration;

use coinstream_rs::{spawn_filter_watcher, FeedClient, FeedConfig};
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coinstream_rs=debug")),
        )
        .init();

    let ws_url =
        std::env::var("COINSTREAM_WS_URL").unwrap_or_else(|_| "ws://localhost:8080/ws".to_string());
    let api_url = std::env::var("COINSTREAM_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080/api".to_string());

    let client = FeedClient::new(FeedConfig::new(ws_url, api_url));
    client.connect().await;

    let (filter_tx, filter_rx) = watch::channel(None);
    spawn_filter_watcher(client.clone(), filter_rx);

    println!("Streaming all trades, unfiltered...");
    tokio::time::sleep(Duration::from_secs(10)).await;
    println!("full feed: {} trades", client.all_trades().await.len());

    println!("Filtering to SOL...");
    filter_tx.send_replace(Some("SOL".to_string()));
    tokio::time::sleep(Duration::from_secs(10)).await;
    println!("full feed: {} trades", client.all_trades().await.len());

    println!("Back to unfiltered...");
    filter_tx.send_replace(None);
    tokio::time::sleep(Duration::from_secs(10)).await;
    println!("full feed: {} trades", client.all_trades().await.len());

    client.disconnect().await;
}

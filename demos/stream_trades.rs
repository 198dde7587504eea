use std::time::Duration;

use coinstream_rs::{FeedClient, FeedConfig};

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

    println!("Connecting to the event stream...");
    client.connect().await;

    let mut connectivity = client.connectivity();
    connectivity
        .wait_for(|connected| *connected)
        .await
        .expect("connectivity observable closed");
    println!("✅ Connected. Watching the trade feeds...\n");

    loop {
        tokio::time::sleep(Duration::from_secs(5)).await;

        let preview = client.live_trades().await;
        let full = client.all_trades().await;
        println!(
            "preview feed: {} trades | full feed: {} trades | connected: {}",
            preview.len(),
            full.len(),
            client.is_connected()
        );
        if let Some(latest) = full.first() {
            println!(
                "  latest: {:?} {} {} @ {} (total {})",
                latest.kind, latest.username, latest.coin_symbol, latest.price, latest.total_value
            );
        }
    }
}

//! Mirrors what a coin page does: bind the session to one coin and listen
//! for its comments and price ticks.

use std::time::Duration;

use coinstream_rs::{FeedClient, FeedConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("coinstream_rs=info")),
        )
        .init();

    let ws_url =
        std::env::var("COINSTREAM_WS_URL").unwrap_or_else(|_| "ws://localhost:8080/ws".to_string());
    let api_url = std::env::var("COINSTREAM_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080/api".to_string());
    let coin = std::env::var("COINSTREAM_COIN").unwrap_or_else(|_| "SOL".to_string());

    let client = FeedClient::new(FeedConfig::new(ws_url, api_url));
    client.connect().await;

    let mut connectivity = client.connectivity();
    connectivity
        .wait_for(|connected| *connected)
        .await
        .expect("connectivity observable closed");

    let comment_handle = client
        .subscribe_to_comments(coin.clone(), |comment| {
            println!("[comment] {:?}: {:?}", comment.kind, comment.body);
        })
        .await;
    let price_handle = client
        .subscribe_to_price_updates(coin.clone(), |price| {
            println!(
                "[price] {} = {} (24h {:+}%)",
                price.coin_symbol, price.current_price, price.change_24h
            );
        })
        .await;

    client.set_coin(coin.clone()).await;
    println!("Bound to {}. Listening for 60 seconds...", coin);

    tokio::time::sleep(Duration::from_secs(60)).await;

    // navigating away: the comment callback is ours to remove
    comment_handle.unsubscribe().await;
    price_handle.unsubscribe().await;
    client.disconnect().await;
    println!("Done.");
}

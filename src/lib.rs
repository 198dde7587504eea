//! # coinstream-rs
//!
//! A Rust client library for a multiplexed real-time coin trading event
//! stream.
//!
//! One persistent WebSocket connection carries several logical feeds — every
//! trade, high-value trades, per-coin price updates, per-coin comment events,
//! and user notifications — and this crate owns that connection end to end:
//!
//! - **Connection lifecycle**: idempotent connect, automatic fixed-delay
//!   reconnection, terminal disconnect, server-driven heartbeat
//! - **Subscription multiplexing**: channel subscriptions re-issued on every
//!   open, an active-coin context for comment/price routing, per-coin
//!   callback registration
//! - **Message dispatch**: typed inbound frames with unknown and malformed
//!   payloads degrading to a logged no-op
//! - **Bounded buffering**: capped, newest-first preview and full trade
//!   feeds, seeded over REST and kept current from the stream
//!
//! Game mechanics, authentication, and persistence live in backend
//! collaborators; this crate only consumes their parsed records.
//!
//! ## Example
//!
//! ```no_run
//! use coinstream_rs::{FeedClient, FeedConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = FeedClient::new(FeedConfig::new(
//!         "wss://api.example.com/ws",
//!         "https://api.example.com/api",
//!     ));
//!     client.connect().await;
//!
//!     let mut connectivity = client.connectivity();
//!     connectivity.wait_for(|connected| *connected).await.ok();
//!
//!     client.set_coin("SOL").await;
//!     client
//!         .subscribe_to_price_updates("SOL", |price| {
//!             println!("SOL now {}", price.current_price);
//!         })
//!         .await;
//! }
//! ```

// Public modules
pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod types;

// Internal modules
mod http;

// Re-export commonly used types
pub use client::{RecentTradesQuery, TradesClient};
pub use config::{FeedConfig, DEFAULT_RECONNECT_DELAY};
pub use error::{Error, Result};
pub use feed::{
    spawn_filter_watcher, FeedClient, LoadMode, SubscriptionHandle, FULL_TRADES_CAP, GLOBAL_COIN,
    PREVIEW_MIN_TRADE_VALUE, PREVIEW_TRADES_CAP,
};
pub use types::{
    Alert, ClientFrame, CommentEvent, CommentKind, FeedChannel, Notification, PriceSnapshot,
    ServerFrame, TradeEvent, TradeKind,
};

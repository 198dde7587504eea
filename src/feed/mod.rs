//! The persistent event-stream client.
//!
//! One [`FeedClient`] owns one logical session against the backend: a single
//! WebSocket connection multiplexing the trade feeds, price updates, comment
//! events, and user notifications, with automatic reconnection and
//! subscription re-establishment, plus REST seeding of the trade buffers.
//!
//! Everything the session mutates (buffers, price cache, callback
//! registries, flags, the socket handle itself) lives behind one shared
//! session object, so independent clients can coexist in one process and
//! tests can drive a session end to end.

mod buffer;
mod connection;
mod dispatch;
mod loader;
mod price_cache;
mod reactor;
mod registry;

pub use loader::LoadMode;
pub use reactor::spawn_filter_watcher;
pub use registry::{SubscriptionHandle, GLOBAL_COIN};

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Notify, RwLock};
use tracing::trace;

use crate::client::TradesClient;
use crate::config::FeedConfig;
use crate::types::{Alert, ClientFrame, Notification, PriceSnapshot, TradeEvent};

use buffer::TradeBuffer;
use price_cache::PriceCache;
use registry::SubscriptionRegistry;

/// Capacity of the preview (high-value ticker) trade buffer.
pub const PREVIEW_TRADES_CAP: usize = 5;
/// Capacity of the full trade-list buffer.
pub const FULL_TRADES_CAP: usize = 100;
/// Minimum trade value requested when seeding the preview buffer.
pub const PREVIEW_MIN_TRADE_VALUE: u64 = 1000;

/// Client for the multiplexed real-time event stream.
///
/// Cloning is cheap and every clone drives the same session.
///
/// # Example
///
/// ```no_run
/// use coinstream_rs::{FeedClient, FeedConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let client = FeedClient::new(FeedConfig::new(
///         "wss://api.example.com/ws",
///         "https://api.example.com/api",
///     ));
///     client.connect().await;
///
///     let mut connectivity = client.connectivity();
///     connectivity.wait_for(|connected| *connected).await.ok();
///     println!("live trades: {:?}", client.live_trades().await);
/// }
/// ```
#[derive(Clone)]
pub struct FeedClient {
    pub(crate) inner: Arc<FeedInner>,
}

/// Shared session state.
///
/// The original design kept these as module-level singletons; they are fields
/// of one session object here so construction and teardown are explicit.
pub(crate) struct FeedInner {
    pub(crate) config: FeedConfig,
    pub(crate) trades_api: TradesClient,

    /// Preview feed, cap [`PREVIEW_TRADES_CAP`], newest first.
    pub(crate) live_trades: RwLock<TradeBuffer>,
    /// Full feed, cap [`FULL_TRADES_CAP`], newest first.
    pub(crate) all_trades: RwLock<TradeBuffer>,
    pub(crate) prices: RwLock<PriceCache>,
    pub(crate) registry: Arc<RwLock<SubscriptionRegistry>>,

    pub(crate) notifications: RwLock<Vec<Notification>>,
    pub(crate) unread_count: AtomicU32,
    pub(crate) alert_tx: RwLock<Option<mpsc::UnboundedSender<Alert>>>,

    /// Write half of the active socket, while one is attached.
    pub(crate) outbound: RwLock<Option<mpsc::UnboundedSender<ClientFrame>>>,
    pub(crate) user_id: RwLock<Option<String>>,

    pub(crate) connected_tx: watch::Sender<bool>,
    pub(crate) loading_tx: watch::Sender<bool>,
    pub(crate) filter_tx: watch::Sender<Option<String>>,

    /// True while the session task (connect loop) is alive.
    pub(crate) running: AtomicBool,
    /// Set by [`FeedClient::disconnect`]; checked before any reconnect is
    /// scheduled so a manual teardown is terminal.
    pub(crate) manual_disconnect: AtomicBool,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Short-circuits the pending reconnect delay when `connect()` is called
    /// while the session task is parked between attempts.
    pub(crate) connect_now: Notify,

    /// Seeding tickets, one lane per buffer; stale completions are discarded.
    pub(crate) preview_seed_seq: AtomicU64,
    pub(crate) expanded_seed_seq: AtomicU64,
}

impl FeedClient {
    /// Create a client for the given endpoints.
    ///
    /// No connection is opened and no request is issued until
    /// [`connect`](Self::connect) is called.
    pub fn new(config: FeedConfig) -> Self {
        let trades_api = TradesClient::new(config.api_url.clone());
        let (connected_tx, _) = watch::channel(false);
        let (loading_tx, _) = watch::channel(false);
        let (filter_tx, _) = watch::channel(None);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            inner: Arc::new(FeedInner {
                config,
                trades_api,
                live_trades: RwLock::new(TradeBuffer::new(PREVIEW_TRADES_CAP)),
                all_trades: RwLock::new(TradeBuffer::new(FULL_TRADES_CAP)),
                prices: RwLock::new(PriceCache::default()),
                registry: Arc::new(RwLock::new(SubscriptionRegistry::new())),
                notifications: RwLock::new(Vec::new()),
                unread_count: AtomicU32::new(0),
                alert_tx: RwLock::new(None),
                outbound: RwLock::new(None),
                user_id: RwLock::new(None),
                connected_tx,
                loading_tx,
                filter_tx,
                running: AtomicBool::new(false),
                manual_disconnect: AtomicBool::new(false),
                shutdown_tx,
                connect_now: Notify::new(),
                preview_seed_seq: AtomicU64::new(0),
                expanded_seed_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Observable connectivity flag: true while a socket is open.
    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.inner.connected_tx.subscribe()
    }

    /// Whether a socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// Observable loading flag for the trade-seeding requests.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.loading_tx.subscribe()
    }

    /// Observable trade filter restricting the all-trades feed.
    pub fn trade_filter(&self) -> watch::Receiver<Option<String>> {
        self.inner.filter_tx.subscribe()
    }

    /// Snapshot of the preview feed, newest first.
    pub async fn live_trades(&self) -> Vec<TradeEvent> {
        self.inner.live_trades.read().await.snapshot()
    }

    /// Snapshot of the full feed, newest first.
    pub async fn all_trades(&self) -> Vec<TradeEvent> {
        self.inner.all_trades.read().await.snapshot()
    }

    /// Latest price snapshot for one coin, if any has been received.
    pub async fn price(&self, coin_symbol: &str) -> Option<PriceSnapshot> {
        self.inner.prices.read().await.get(coin_symbol).cloned()
    }

    /// Snapshot of every coin's latest price.
    pub async fn prices(&self) -> HashMap<String, PriceSnapshot> {
        self.inner.prices.read().await.snapshot()
    }

    /// Coin symbol the session's comment/price context is bound to.
    pub async fn active_coin(&self) -> String {
        self.inner.registry.read().await.active_coin.clone()
    }

    /// Notifications received this session, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.inner.notifications.read().await.clone()
    }

    /// Number of notifications not yet marked read.
    pub fn unread_count(&self) -> u32 {
        self.inner.unread_count.load(Ordering::Relaxed)
    }

    /// Subscribe to transient alerts (one per notification frame).
    ///
    /// Only the most recent subscriber receives alerts; alerts emitted while
    /// nobody listens are dropped.
    pub async fn alerts(&self) -> mpsc::UnboundedReceiver<Alert> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.alert_tx.write().await = Some(tx);
        rx
    }
}

impl FeedInner {
    pub(crate) fn is_connected(&self) -> bool {
        *self.connected_tx.borrow()
    }

    /// Queue a frame for the session task to write out.
    ///
    /// Dropped silently when no socket is attached, matching a send on a
    /// closed socket being a no-op.
    pub(crate) async fn send_frame(&self, frame: ClientFrame) {
        let outbound = self.outbound.read().await;
        match outbound.as_ref() {
            Some(tx) => {
                if tx.send(frame).is_err() {
                    trace!("outbound channel closed; frame dropped");
                }
            }
            None => trace!(?frame, "no socket attached; frame dropped"),
        }
    }

    pub(crate) fn current_trade_filter(&self) -> Option<String> {
        self.filter_tx.borrow().clone()
    }
}

impl fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedClient")
            .field("config", &self.inner.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

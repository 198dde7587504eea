use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{ClientFrame, CommentEvent, PriceSnapshot};

use super::{FeedClient, FeedInner};

/// Sentinel coin symbol the session is bound to before any `set_coin` call.
pub const GLOBAL_COIN: &str = "@global";

pub(crate) type CommentCallback = Arc<dyn Fn(&CommentEvent) + Send + Sync>;
pub(crate) type PriceCallback = Arc<dyn Fn(&PriceSnapshot) + Send + Sync>;

/// Per-coin callback registration for comment and price-update events, plus
/// the session's active coin context.
///
/// Registering under an already-used key replaces the previous callback.
/// That is deliberate: the registries exist so the currently-viewed coin
/// page receives events, so there is no multi-listener fan-out.
pub(crate) struct SubscriptionRegistry {
    pub(crate) active_coin: String,
    comments: HashMap<String, CommentCallback>,
    prices: HashMap<String, PriceCallback>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            active_coin: GLOBAL_COIN.to_string(),
            comments: HashMap::new(),
            prices: HashMap::new(),
        }
    }

    pub(crate) fn subscribe_comments(&mut self, coin: String, callback: CommentCallback) {
        self.comments.insert(coin, callback);
    }

    pub(crate) fn unsubscribe_comments(&mut self, coin: &str) {
        self.comments.remove(coin);
    }

    pub(crate) fn subscribe_prices(&mut self, coin: String, callback: PriceCallback) {
        self.prices.insert(coin, callback);
    }

    pub(crate) fn unsubscribe_prices(&mut self, coin: &str) {
        self.prices.remove(coin);
    }

    /// Clone out the comment callback for `coin` so it can be invoked after
    /// the registry lock is released.
    pub(crate) fn comment_callback(&self, coin: &str) -> Option<CommentCallback> {
        self.comments.get(coin).cloned()
    }

    pub(crate) fn price_callback(&self, coin: &str) -> Option<PriceCallback> {
        self.prices.get(coin).cloned()
    }
}

#[derive(Debug, Clone, Copy)]
enum HandleKind {
    Comments,
    Prices,
}

/// Disposer returned from callback registration.
///
/// Dropping the handle does nothing; call
/// [`unsubscribe`](SubscriptionHandle::unsubscribe) for deterministic
/// removal. The `unsubscribe_from_*` methods on [`FeedClient`] remain
/// available for callers that key removal by coin instead.
pub struct SubscriptionHandle {
    registry: Weak<RwLock<SubscriptionRegistry>>,
    coin: String,
    kind: HandleKind,
}

impl SubscriptionHandle {
    /// Remove the registration this handle was returned from.
    ///
    /// A later registration under the same coin replaces the earlier one, so
    /// after such a replacement this removes the replacement (last writer
    /// wins applies to removal too).
    pub async fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.write().await;
            match self.kind {
                HandleKind::Comments => registry.unsubscribe_comments(&self.coin),
                HandleKind::Prices => registry.unsubscribe_prices(&self.coin),
            }
        }
    }
}

impl FeedClient {
    /// (Re)issue the channel subscriptions for this session.
    ///
    /// Always sends three frames, in order: `trades:all` (filtered by
    /// `filter_override` when given, else the current trade filter),
    /// `trades:large` (always global), and `set_coin` for the active coin.
    /// Called automatically on every open; the backend replaces an earlier
    /// subscription for the same channel, so no unsubscribe is ever sent.
    pub async fn subscribe_to_channels(&self, filter_override: Option<String>) {
        self.inner.subscribe_to_channels(filter_override).await
    }

    /// Bind the session's comment/price context to `coin`.
    ///
    /// When the coin actually changes and the outgoing coin is not the
    /// global sentinel, the outgoing coin's price callback is evicted; the
    /// comment callback is left registered, its owner unregisters it when
    /// navigating away. The `set_coin` frame is sent unconditionally, even
    /// for an unchanged coin.
    pub async fn set_coin(&self, coin: impl Into<String>) {
        let coin = coin.into();
        {
            let mut registry = self.inner.registry.write().await;
            if registry.active_coin != coin && registry.active_coin != GLOBAL_COIN {
                let outgoing = registry.active_coin.clone();
                registry.unsubscribe_prices(&outgoing);
                debug!(coin = %outgoing, "evicted price callback for outgoing coin");
            }
            registry.active_coin = coin.clone();
        }
        self.inner
            .send_frame(ClientFrame::SetCoin { coin_symbol: coin })
            .await;
    }

    /// Register the comment callback for `coin`, replacing any previous one.
    ///
    /// Comment delivery is implicit via `set_coin`; no wire message is sent.
    pub async fn subscribe_to_comments(
        &self,
        coin: impl Into<String>,
        callback: impl Fn(&CommentEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let coin = coin.into();
        self.inner
            .registry
            .write()
            .await
            .subscribe_comments(coin.clone(), Arc::new(callback));
        SubscriptionHandle {
            registry: Arc::downgrade(&self.inner.registry),
            coin,
            kind: HandleKind::Comments,
        }
    }

    /// Remove the comment callback for `coin`, if any.
    pub async fn unsubscribe_from_comments(&self, coin: &str) {
        self.inner.registry.write().await.unsubscribe_comments(coin);
    }

    /// Register the price-update callback for `coin`, replacing any
    /// previous one. No wire message is sent.
    pub async fn subscribe_to_price_updates(
        &self,
        coin: impl Into<String>,
        callback: impl Fn(&PriceSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        let coin = coin.into();
        self.inner
            .registry
            .write()
            .await
            .subscribe_prices(coin.clone(), Arc::new(callback));
        SubscriptionHandle {
            registry: Arc::downgrade(&self.inner.registry),
            coin,
            kind: HandleKind::Prices,
        }
    }

    /// Remove the price-update callback for `coin`, if any.
    pub async fn unsubscribe_from_price_updates(&self, coin: &str) {
        self.inner.registry.write().await.unsubscribe_prices(coin);
    }

    /// Bind the stream to a user identity.
    ///
    /// The identity is remembered for subsequent opens and a `set_user`
    /// frame is sent immediately when a socket is currently attached.
    pub async fn set_user(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        *self.inner.user_id.write().await = Some(user_id.clone());
        if self.inner.is_connected() {
            self.inner
                .send_frame(ClientFrame::SetUser { user_id })
                .await;
        }
    }
}

impl FeedInner {
    pub(crate) async fn subscribe_to_channels(&self, filter_override: Option<String>) {
        let filter = filter_override.or_else(|| self.current_trade_filter());
        self.send_frame(ClientFrame::subscribe_all_trades(filter))
            .await;
        self.send_frame(ClientFrame::subscribe_large_trades()).await;
        let active_coin = self.registry.read().await.active_coin.clone();
        self.send_frame(ClientFrame::SetCoin {
            coin_symbol: active_coin,
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::types::FeedChannel;
    use tokio::sync::mpsc;

    fn test_client() -> FeedClient {
        FeedClient::new(FeedConfig::new(
            "ws://127.0.0.1:1/ws",
            "http://127.0.0.1:1/api",
        ))
    }

    /// Attach a capture channel in place of a real socket.
    async fn attach_outbound(client: &FeedClient) -> mpsc::UnboundedReceiver<ClientFrame> {
        let (tx, rx) = mpsc::unbounded_channel();
        *client.inner.outbound.write().await = Some(tx);
        rx
    }

    #[test]
    fn test_set_coin_evicts_outgoing_price_callback() {
        tokio_test::block_on(async {
            let client = test_client();
            let mut outbound = attach_outbound(&client).await;

            client.subscribe_to_price_updates("ETH", |_| {}).await;
            client.set_coin("ETH").await;
            client.set_coin("BTC").await;

            let registry = client.inner.registry.read().await;
            assert!(registry.price_callback("ETH").is_none());
            assert_eq!(registry.active_coin, "BTC");
            drop(registry);

            // set_coin is sent on both calls
            assert_eq!(
                outbound.recv().await,
                Some(ClientFrame::SetCoin {
                    coin_symbol: "ETH".to_string()
                })
            );
            assert_eq!(
                outbound.recv().await,
                Some(ClientFrame::SetCoin {
                    coin_symbol: "BTC".to_string()
                })
            );
        });
    }

    #[test]
    fn test_set_coin_from_global_sentinel_keeps_callbacks() {
        tokio_test::block_on(async {
            let client = test_client();
            client.subscribe_to_price_updates("ETH", |_| {}).await;
            // active coin is still @global, so nothing is evicted
            client.set_coin("ETH").await;
            assert!(client.inner.registry.read().await.price_callback("ETH").is_some());
        });
    }

    #[test]
    fn test_set_coin_same_value_still_sends_frame() {
        tokio_test::block_on(async {
            let client = test_client();
            let mut outbound = attach_outbound(&client).await;
            client.set_coin("ETH").await;
            client.set_coin("ETH").await;
            assert!(outbound.recv().await.is_some());
            assert!(outbound.recv().await.is_some());
        });
    }

    #[test]
    fn test_subscribe_to_channels_sends_three_frames_in_order() {
        tokio_test::block_on(async {
            let client = test_client();
            let mut outbound = attach_outbound(&client).await;

            client.subscribe_to_channels(None).await;

            assert_eq!(
                outbound.recv().await,
                Some(ClientFrame::subscribe_all_trades(None))
            );
            assert_eq!(
                outbound.recv().await,
                Some(ClientFrame::subscribe_large_trades())
            );
            assert_eq!(
                outbound.recv().await,
                Some(ClientFrame::SetCoin {
                    coin_symbol: GLOBAL_COIN.to_string()
                })
            );
        });
    }

    #[test]
    fn test_subscribe_to_channels_override_beats_current_filter() {
        tokio_test::block_on(async {
            let client = test_client();
            client.inner.filter_tx.send_replace(Some("DOGE".to_string()));
            let mut outbound = attach_outbound(&client).await;

            client
                .subscribe_to_channels(Some("SOL".to_string()))
                .await;

            match outbound.recv().await {
                Some(ClientFrame::Subscribe {
                    channel: FeedChannel::AllTrades,
                    coin_symbol,
                }) => assert_eq!(coin_symbol, Some(Some("SOL".to_string()))),
                other => panic!("unexpected frame: {:?}", other),
            }
        });
    }

    #[test]
    fn test_callback_registration_replaces_previous() {
        tokio_test::block_on(async {
            use std::sync::atomic::{AtomicUsize, Ordering};

            let client = test_client();
            let first = Arc::new(AtomicUsize::new(0));
            let second = Arc::new(AtomicUsize::new(0));

            let hits = Arc::clone(&first);
            client
                .subscribe_to_comments("SOL", move |_| {
                    hits.fetch_add(1, Ordering::Relaxed);
                })
                .await;
            let hits = Arc::clone(&second);
            client
                .subscribe_to_comments("SOL", move |_| {
                    hits.fetch_add(1, Ordering::Relaxed);
                })
                .await;

            let callback = client
                .inner
                .registry
                .read()
                .await
                .comment_callback("SOL")
                .expect("callback registered");
            callback(&CommentEvent {
                kind: crate::types::CommentKind::NewComment,
                body: serde_json::Map::new(),
            });

            assert_eq!(first.load(Ordering::Relaxed), 0);
            assert_eq!(second.load(Ordering::Relaxed), 1);
        });
    }

    #[test]
    fn test_subscription_handle_unsubscribes() {
        tokio_test::block_on(async {
            let client = test_client();
            let handle = client.subscribe_to_price_updates("ETH", |_| {}).await;
            assert!(client.inner.registry.read().await.price_callback("ETH").is_some());
            handle.unsubscribe().await;
            assert!(client.inner.registry.read().await.price_callback("ETH").is_none());
        });
    }

    #[test]
    fn test_set_user_while_disconnected_is_remembered_not_sent() {
        tokio_test::block_on(async {
            let client = test_client();
            let mut outbound = attach_outbound(&client).await;
            client.set_user("42").await;
            assert_eq!(
                client.inner.user_id.read().await.as_deref(),
                Some("42")
            );
            // not connected, so nothing was queued
            assert!(outbound.try_recv().is_err());
        });
    }
}

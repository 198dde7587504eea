use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::types::ClientFrame;

use super::{FeedClient, LoadMode};

impl FeedClient {
    /// Change the trade filter restricting the all-trades feed.
    ///
    /// A no-op when the value is unchanged. On an actual change the full
    /// buffer is cleared immediately (no stale-filter rows while the new
    /// batch loads), the loading flag is raised, an expanded seed is
    /// launched with the new filter, and — when connected — the
    /// `trades:all` subscription is re-sent with the new filter. A single
    /// resend suffices; the backend replaces the earlier subscription for
    /// the channel. The large-trades feed is always global and unaffected.
    pub async fn set_trade_filter(&self, filter: Option<String>) {
        let inner = &self.inner;

        let changed = inner.filter_tx.send_if_modified(|current| {
            if *current == filter {
                false
            } else {
                *current = filter.clone();
                true
            }
        });
        if !changed {
            debug!(?filter, "trade filter unchanged");
            return;
        }

        info!(?filter, "trade filter changed; reloading all-trades feed");
        inner.all_trades.write().await.clear();
        inner.loading_tx.send_replace(true);

        let seed_inner = Arc::clone(inner);
        let seed_filter = filter.clone();
        tokio::spawn(async move {
            seed_inner
                .load_initial_trades(LoadMode::Expanded, seed_filter)
                .await;
        });

        if inner.is_connected() {
            inner
                .send_frame(ClientFrame::subscribe_all_trades(filter))
                .await;
        }
    }
}

/// Drive [`FeedClient::set_trade_filter`] from an external reactive filter
/// source.
///
/// The task applies every change observed on `source` and ends when the
/// sender side is dropped.
pub fn spawn_filter_watcher(
    client: FeedClient,
    mut source: watch::Receiver<Option<String>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while source.changed().await.is_ok() {
            let filter = source.borrow_and_update().clone();
            client.set_trade_filter(filter).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::feed::testutil::trade;
    use crate::types::FeedChannel;
    use tokio::sync::mpsc;

    fn test_client() -> FeedClient {
        FeedClient::new(FeedConfig::new(
            "ws://127.0.0.1:1/ws",
            "http://127.0.0.1:1/api",
        ))
    }

    async fn attach_outbound(client: &FeedClient) -> mpsc::UnboundedReceiver<ClientFrame> {
        let (tx, rx) = mpsc::unbounded_channel();
        *client.inner.outbound.write().await = Some(tx);
        rx
    }

    #[tokio::test]
    async fn test_filter_change_clears_buffer_and_resubscribes() {
        // An API listener that never answers keeps the relaunched seed (and
        // with it the loading flag) in flight for the whole test.
        let api_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = FeedClient::new(FeedConfig::new(
            "ws://127.0.0.1:1/ws",
            format!("http://{}/api", api_listener.local_addr().unwrap()),
        ));
        client
            .inner
            .all_trades
            .write()
            .await
            .replace(vec![trade("DOGE", 1)]);
        let mut outbound = attach_outbound(&client).await;
        client.inner.connected_tx.send_replace(true);

        client.set_trade_filter(Some("SOL".to_string())).await;

        assert!(*client.loading().borrow());
        assert_eq!(
            client.trade_filter().borrow().as_deref(),
            Some("SOL")
        );
        assert!(client.all_trades().await.is_empty());
        match outbound.recv().await {
            Some(ClientFrame::Subscribe {
                channel: FeedChannel::AllTrades,
                coin_symbol,
            }) => assert_eq!(coin_symbol, Some(Some("SOL".to_string()))),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unchanged_filter_is_a_no_op() {
        let client = test_client();
        let mut outbound = attach_outbound(&client).await;
        client.inner.connected_tx.send_replace(true);
        client
            .inner
            .all_trades
            .write()
            .await
            .replace(vec![trade("DOGE", 1)]);

        client.set_trade_filter(None).await;

        assert_eq!(client.all_trades().await.len(), 1);
        assert!(outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_resubscribe_while_disconnected() {
        let client = test_client();
        let mut outbound = attach_outbound(&client).await;

        client.set_trade_filter(Some("SOL".to_string())).await;

        assert!(outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_filter_watcher_applies_external_changes() {
        let client = test_client();
        let (tx, rx) = watch::channel(None);
        let watcher = spawn_filter_watcher(client.clone(), rx);

        tx.send_replace(Some("SOL".to_string()));
        let mut filter = client.trade_filter();
        filter
            .wait_for(|value| value.as_deref() == Some("SOL"))
            .await
            .expect("filter propagated");

        drop(tx);
        watcher.await.expect("watcher task ends cleanly");
    }
}

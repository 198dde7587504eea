use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::client::RecentTradesQuery;
use crate::error::Result;
use crate::types::TradeEvent;

use super::{FeedClient, FeedInner, FULL_TRADES_CAP, PREVIEW_MIN_TRADE_VALUE, PREVIEW_TRADES_CAP};

/// Which feed a seeding request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Small, value-thresholded batch for the preview feed; ignores any
    /// filter.
    Preview,
    /// Up to the full-feed cap, honoring the trade filter.
    Expanded,
}

impl FeedClient {
    /// Seed a feed buffer from the recent-trades endpoint.
    ///
    /// On success the target buffer is replaced wholesale with the response.
    /// On failure the full buffer is cleared (best-effort degrade to empty)
    /// while the preview buffer is left untouched; there is no automatic
    /// retry, the next attempt comes with a later filter change or
    /// reconnect. The loading flag is raised for the duration.
    ///
    /// Seeding requests race the socket and each other, so every request
    /// draws a per-buffer ticket; a completion that is no longer the latest
    /// ticket for its buffer is discarded entirely.
    ///
    /// # Arguments
    /// * `mode` - which buffer to seed
    /// * `filter` - coin restriction for [`LoadMode::Expanded`]; falls back
    ///   to the current trade filter when `None`. Ignored for previews.
    pub async fn load_initial_trades(&self, mode: LoadMode, filter: Option<String>) {
        self.inner.load_initial_trades(mode, filter).await
    }
}

impl FeedInner {
    pub(crate) async fn load_initial_trades(&self, mode: LoadMode, filter: Option<String>) {
        let effective_filter = match mode {
            LoadMode::Preview => None,
            LoadMode::Expanded => filter.or_else(|| self.current_trade_filter()),
        };

        let ticket = self.issue_seed_ticket(mode);
        self.loading_tx.send_replace(true);

        let query = query_for(mode, effective_filter);
        let result = self.trades_api.recent_trades(&query).await;
        self.apply_seed_result(mode, ticket, result).await;
    }

    fn seed_lane(&self, mode: LoadMode) -> &AtomicU64 {
        match mode {
            LoadMode::Preview => &self.preview_seed_seq,
            LoadMode::Expanded => &self.expanded_seed_seq,
        }
    }

    pub(crate) fn issue_seed_ticket(&self, mode: LoadMode) -> u64 {
        self.seed_lane(mode).fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest_seed(&self, mode: LoadMode, ticket: u64) -> bool {
        self.seed_lane(mode).load(Ordering::SeqCst) == ticket
    }

    /// Apply a completed seeding request.
    ///
    /// A superseded completion must not touch the buffer or the loading
    /// flag: a newer request owns both by now.
    pub(crate) async fn apply_seed_result(
        &self,
        mode: LoadMode,
        ticket: u64,
        result: Result<Vec<TradeEvent>>,
    ) {
        if !self.is_latest_seed(mode, ticket) {
            debug!(?mode, ticket, "discarding superseded seed response");
            return;
        }

        match result {
            Ok(trades) => {
                debug!(?mode, count = trades.len(), "seeded trade buffer");
                match mode {
                    LoadMode::Preview => self.live_trades.write().await.replace(trades),
                    LoadMode::Expanded => self.all_trades.write().await.replace(trades),
                }
            }
            Err(err) => {
                warn!(%err, ?mode, "failed to load initial trades");
                if mode == LoadMode::Expanded {
                    self.all_trades.write().await.clear();
                }
            }
        }

        self.loading_tx.send_replace(false);
    }
}

fn query_for(mode: LoadMode, filter: Option<String>) -> RecentTradesQuery {
    match mode {
        LoadMode::Preview => {
            RecentTradesQuery::new(PREVIEW_TRADES_CAP).with_min_value(PREVIEW_MIN_TRADE_VALUE)
        }
        LoadMode::Expanded => {
            let query = RecentTradesQuery::new(FULL_TRADES_CAP);
            match filter {
                Some(coin) => query.with_coin_symbol(coin),
                None => query,
            }
        }
    }
}

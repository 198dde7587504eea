use std::sync::atomic::Ordering;

use chrono::Utc;
use tracing::{debug, warn};

use crate::types::{Alert, ClientFrame, CommentEvent, CommentKind, Notification, ServerFrame};

use super::FeedInner;

impl FeedInner {
    /// Parse and route one inbound text frame.
    ///
    /// Never fails and never touches connection state: malformed payloads
    /// and unrecognized types degrade to a logged no-op.
    pub(crate) async fn dispatch_text(&self, text: &str) {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                warn!(%err, "dropping malformed frame");
                return;
            }
        };

        let frame = match serde_json::from_value::<ServerFrame>(value.clone()) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "dropping frame with unexpected shape");
                return;
            }
        };

        match frame {
            ServerFrame::LiveTrade { data } => {
                self.live_trades.write().await.push_front(data);
            }
            ServerFrame::AllTrades { data } => {
                self.all_trades.write().await.push_front(data);
            }
            ServerFrame::PriceUpdate(snapshot) => {
                self.prices.write().await.upsert(snapshot.clone());
                let callback = self
                    .registry
                    .read()
                    .await
                    .price_callback(&snapshot.coin_symbol);
                if let Some(callback) = callback {
                    callback(&snapshot);
                }
            }
            ServerFrame::Ping => {
                self.send_frame(ClientFrame::Pong).await;
            }
            ServerFrame::NewComment { body } => {
                self.route_comment(CommentKind::NewComment, body).await;
            }
            ServerFrame::CommentLiked { body } => {
                self.route_comment(CommentKind::CommentLiked, body).await;
            }
            ServerFrame::Notification {
                notification_type,
                title,
                message,
                timestamp,
                amount,
            } => {
                self.ingest_notification(notification_type, title, message, timestamp, amount)
                    .await;
            }
            ServerFrame::Unknown => {
                let kind = value
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("<missing>");
                debug!(message_type = kind, "unhandled message type");
            }
        }
    }

    /// Comment frames carry no coin id; the only candidate listener is the
    /// one registered under the current active coin.
    async fn route_comment(&self, kind: CommentKind, body: serde_json::Map<String, serde_json::Value>) {
        let callback = {
            let registry = self.registry.read().await;
            registry.comment_callback(&registry.active_coin)
        };
        match callback {
            Some(callback) => callback(&CommentEvent { kind, body }),
            None => debug!("comment event with no listener; discarded"),
        }
    }

    async fn ingest_notification(
        &self,
        kind: String,
        title: String,
        message: String,
        created_at: i64,
        amount: Option<f64>,
    ) {
        let notification = Notification {
            id: Utc::now().timestamp_millis(),
            kind,
            title: title.clone(),
            message: message.clone(),
            read: false,
            created_at,
            amount,
        };
        self.notifications.write().await.insert(0, notification);
        self.unread_count.fetch_add(1, Ordering::Relaxed);

        let alert_tx = self.alert_tx.read().await;
        if let Some(tx) = alert_tx.as_ref() {
            if tx.send(Alert::for_notification(title, message)).is_err() {
                debug!("alert receiver dropped; alert discarded");
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use super::epoch_millis;
use super::{PriceSnapshot, TradeEvent};

/// Logical subscription topics multiplexed over the single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedChannel {
    /// Every trade, optionally filtered to one coin.
    #[serde(rename = "trades:all")]
    AllTrades,
    /// High-value trades only; always global.
    #[serde(rename = "trades:large")]
    LargeTrades,
}

/// Outbound (client → server) frames.
///
/// The backend treats a later `subscribe` for the same channel as replacing
/// the prior one, so filter changes re-send the subscribe frame instead of
/// pairing it with an explicit unsubscribe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe {
        channel: FeedChannel,
        /// `Some(None)` serializes as an explicit `coinSymbol: null`
        /// (unfiltered all-trades subscription); `None` omits the key
        /// entirely for channels that take no filter.
        #[serde(rename = "coinSymbol", skip_serializing_if = "Option::is_none")]
        coin_symbol: Option<Option<String>>,
    },
    SetCoin {
        #[serde(rename = "coinSymbol")]
        coin_symbol: String,
    },
    SetUser {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Pong,
}

impl ClientFrame {
    /// Subscribe to the all-trades feed, optionally filtered to one coin.
    pub fn subscribe_all_trades(filter: Option<String>) -> Self {
        ClientFrame::Subscribe {
            channel: FeedChannel::AllTrades,
            coin_symbol: Some(filter),
        }
    }

    /// Subscribe to the large-trades feed.
    pub fn subscribe_large_trades() -> Self {
        ClientFrame::Subscribe {
            channel: FeedChannel::LargeTrades,
            coin_symbol: None,
        }
    }
}

/// Inbound (server → client) frames, tagged on `type`.
///
/// Every message kind the backend pushes has a variant; anything else lands
/// on [`ServerFrame::Unknown`] so an unrecognized tag stays a distinct,
/// loggable case instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Preview feed push (high-value trades).
    #[serde(rename = "live-trade")]
    LiveTrade { data: TradeEvent },
    /// Full feed push.
    #[serde(rename = "all-trades")]
    AllTrades { data: TradeEvent },
    /// Price snapshot for one coin; fields are flat on the frame.
    #[serde(rename = "price_update")]
    PriceUpdate(PriceSnapshot),
    /// Server liveness probe; answered with an immediate pong.
    #[serde(rename = "ping")]
    Ping,
    /// Comment created on the active coin. No coin id on the wire; see
    /// [`CommentEvent`](super::CommentEvent).
    #[serde(rename = "new_comment")]
    NewComment {
        #[serde(flatten)]
        body: serde_json::Map<String, serde_json::Value>,
    },
    /// Comment liked on the active coin.
    #[serde(rename = "comment_liked")]
    CommentLiked {
        #[serde(flatten)]
        body: serde_json::Map<String, serde_json::Value>,
    },
    /// User notification for the bound identity.
    #[serde(rename = "notification")]
    Notification {
        #[serde(rename = "notificationType")]
        notification_type: String,
        title: String,
        message: String,
        #[serde(deserialize_with = "epoch_millis::deserialize")]
        timestamp: i64,
        #[serde(default)]
        amount: Option<f64>,
    },
    /// Any frame with an unrecognized `type` tag; logged and ignored.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscribe_all_trades_unfiltered_has_explicit_null() {
        let frame = ClientFrame::subscribe_all_trades(None);
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"type": "subscribe", "channel": "trades:all", "coinSymbol": null})
        );
    }

    #[test]
    fn test_subscribe_all_trades_filtered() {
        let frame = ClientFrame::subscribe_all_trades(Some("SOL".to_string()));
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"type": "subscribe", "channel": "trades:all", "coinSymbol": "SOL"})
        );
    }

    #[test]
    fn test_subscribe_large_trades_omits_filter_key() {
        let frame = ClientFrame::subscribe_large_trades();
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"type": "subscribe", "channel": "trades:large"})
        );
    }

    #[test]
    fn test_set_coin_and_set_user_frames() {
        assert_eq!(
            serde_json::to_value(ClientFrame::SetCoin {
                coin_symbol: "@global".to_string()
            })
            .unwrap(),
            json!({"type": "set_coin", "coinSymbol": "@global"})
        );
        assert_eq!(
            serde_json::to_value(ClientFrame::SetUser {
                user_id: "42".to_string()
            })
            .unwrap(),
            json!({"type": "set_user", "userId": "42"})
        );
    }

    #[test]
    fn test_pong_frame() {
        assert_eq!(
            serde_json::to_value(ClientFrame::Pong).unwrap(),
            json!({"type": "pong"})
        );
    }

    #[test]
    fn test_parse_ping() {
        let frame: ServerFrame = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert_eq!(frame, ServerFrame::Ping);
    }

    #[test]
    fn test_parse_live_trade() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "type": "live-trade",
            "data": {
                "type": "SELL",
                "username": "whale",
                "amount": 10.0,
                "coinSymbol": "DOGE",
                "totalValue": 1500.0,
                "price": 150.0,
                "timestamp": 1700000000000i64,
                "userId": "7"
            }
        }))
        .unwrap();
        match frame {
            ServerFrame::LiveTrade { data } => assert_eq!(data.coin_symbol, "DOGE"),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_parse_price_update_flat_fields() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "type": "price_update",
            "coinSymbol": "DOGE",
            "currentPrice": 0.5,
            "marketCap": 100.0,
            "change24h": 2.0,
            "volume24h": 9.0
        }))
        .unwrap();
        match frame {
            ServerFrame::PriceUpdate(snapshot) => {
                assert_eq!(snapshot.coin_symbol, "DOGE");
                assert_eq!(snapshot.current_price, 0.5);
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_parse_comment_keeps_body() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "type": "new_comment",
            "commentId": 9,
            "content": "to the moon"
        }))
        .unwrap();
        match frame {
            ServerFrame::NewComment { body } => {
                assert_eq!(body.get("content").and_then(|v| v.as_str()), Some("to the moon"));
                assert!(!body.contains_key("type"));
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_parse_notification() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "type": "notification",
            "notificationType": "payout",
            "title": "Cashout",
            "message": "You won",
            "timestamp": "1700000000000",
            "amount": 12.5
        }))
        .unwrap();
        match frame {
            ServerFrame::Notification {
                notification_type,
                timestamp,
                amount,
                ..
            } => {
                assert_eq!(notification_type, "payout");
                assert_eq!(timestamp, 1_700_000_000_000);
                assert_eq!(amount, Some(12.5));
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_is_distinct_variant() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"type": "wheel_spin", "payload": 3}"#).unwrap();
        assert_eq!(frame, ServerFrame::Unknown);
    }
}

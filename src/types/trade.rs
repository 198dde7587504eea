use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::epoch_millis;

/// Discriminant of a trade event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeKind {
    Buy,
    Sell,
    TransferIn,
    TransferOut,
}

/// A single trade pushed on the live feeds or returned by the recent-trades
/// endpoint. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    #[serde(rename = "type")]
    pub kind: TradeKind,
    pub username: String,
    pub amount: f64,
    pub coin_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_icon: Option<String>,
    pub total_value: f64,
    pub price: f64,
    /// Epoch milliseconds; producers send integers, floats, or numeric strings.
    #[serde(deserialize_with = "epoch_millis::deserialize")]
    pub timestamp: i64,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
}

impl TradeEvent {
    /// Get the trade timestamp as a UTC DateTime
    pub fn datetime_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now)
    }

    /// Check if this event is a wallet transfer rather than an exchange trade
    pub fn is_transfer(&self) -> bool {
        matches!(self.kind, TradeKind::TransferIn | TradeKind::TransferOut)
    }
}

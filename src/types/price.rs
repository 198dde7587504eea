use serde::{Deserialize, Serialize};

/// Latest price snapshot for a coin.
///
/// Snapshots are last-write-wins per symbol; the feed core keeps no price
/// history (history belongs to the charting collaborator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub coin_symbol: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    /// Present only for pooled-liquidity assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_coin_amount: Option<f64>,
    /// Present only for pooled-liquidity assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_base_currency_amount: Option<f64>,
}

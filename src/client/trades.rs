use serde::Deserialize;

use crate::error::Result;
use crate::http::HttpClient;
use crate::types::TradeEvent;

/// Query parameters for the recent-trades endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTradesQuery {
    /// Maximum number of trades to return.
    pub limit: usize,
    /// Only return trades worth at least this much, when set.
    pub min_value: Option<u64>,
    /// Restrict results to one coin, when set.
    pub coin_symbol: Option<String>,
}

impl RecentTradesQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            min_value: None,
            coin_symbol: None,
        }
    }

    pub fn with_min_value(mut self, min_value: u64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub fn with_coin_symbol(mut self, coin_symbol: impl Into<String>) -> Self {
        self.coin_symbol = Some(coin_symbol.into());
        self
    }

    pub(crate) fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if let Some(min_value) = self.min_value {
            params.push(("minValue", min_value.to_string()));
        }
        if let Some(coin_symbol) = &self.coin_symbol {
            params.push(("coinSymbol", coin_symbol.clone()));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct RecentTradesResponse {
    trades: Vec<TradeEvent>,
}

/// Client for the trades REST endpoints used to seed the feed buffers.
///
/// This is the request/response collaborator of the event stream: it hands
/// back parsed trade records and knows nothing about buffers or sockets.
pub struct TradesClient {
    http_client: HttpClient,
}

impl TradesClient {
    /// Create a new TradesClient
    ///
    /// # Arguments
    /// * `host` - The base URL for the API (e.g., "https://api.example.com/api")
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(host),
        }
    }

    /// Fetch the most recent trades matching the query, newest first.
    pub async fn recent_trades(&self, query: &RecentTradesQuery) -> Result<Vec<TradeEvent>> {
        let response: RecentTradesResponse = self
            .http_client
            .get("/trades/recent", &query.to_query_params())
            .await?;
        Ok(response.trades)
    }
}

use std::collections::HashMap;

use crate::types::PriceSnapshot;

/// Last-write-wins map from coin symbol to its latest price snapshot.
#[derive(Debug, Default)]
pub(crate) struct PriceCache {
    prices: HashMap<String, PriceSnapshot>,
}

impl PriceCache {
    /// Insert or replace the snapshot for its symbol.
    pub(crate) fn upsert(&mut self, snapshot: PriceSnapshot) {
        self.prices.insert(snapshot.coin_symbol.clone(), snapshot);
    }

    pub(crate) fn get(&self, coin_symbol: &str) -> Option<&PriceSnapshot> {
        self.prices.get(coin_symbol)
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, PriceSnapshot> {
        self.prices.clone()
    }
}

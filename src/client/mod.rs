mod trades;

pub use trades::{RecentTradesQuery, TradesClient};

use std::time::Duration;

/// Fixed delay between reconnection attempts.
///
/// The policy is deliberately a flat delay with no backoff, jitter, or retry
/// ceiling: the backend is a single controlled deployment and eventual
/// liveness wins over thundering-herd avoidance.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Endpoints and connection policy for a [`FeedClient`](crate::FeedClient).
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint of the event stream, e.g. `wss://api.example.com/ws`
    pub ws_url: String,
    /// Base URL of the REST API used to seed the trade buffers,
    /// e.g. `https://api.example.com/api`
    pub api_url: String,
    /// Delay between reconnection attempts after a close or failed connect
    pub reconnect_delay: Duration,
}

impl FeedConfig {
    /// Create a configuration with the default reconnect policy.
    ///
    /// # Arguments
    /// * `ws_url` - WebSocket endpoint of the event stream
    /// * `api_url` - base URL of the REST API (no trailing slash required)
    pub fn new(ws_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            api_url: api_url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    /// Override the delay between reconnection attempts.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

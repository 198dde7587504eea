use std::collections::VecDeque;

use crate::types::TradeEvent;

/// Bounded, newest-first sequence of trade events.
///
/// Ingest is prepend-then-truncate, so the sequence stays newest-first as
/// long as every producer goes through [`TradeBuffer::push_front`] in
/// arrival order; there is no provision for historical backfill reordering.
#[derive(Debug)]
pub(crate) struct TradeBuffer {
    cap: usize,
    trades: VecDeque<TradeEvent>,
}

impl TradeBuffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            cap,
            trades: VecDeque::with_capacity(cap),
        }
    }

    /// Prepend one trade, dropping the oldest once the cap is reached.
    pub(crate) fn push_front(&mut self, trade: TradeEvent) {
        self.trades.push_front(trade);
        self.trades.truncate(self.cap);
    }

    /// Replace the whole sequence (REST seeding), clamped to the cap.
    pub(crate) fn replace(&mut self, trades: Vec<TradeEvent>) {
        self.trades = trades.into_iter().take(self.cap).collect();
    }

    pub(crate) fn clear(&mut self) {
        self.trades.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.trades.len()
    }

    /// Snapshot of the current contents, newest first.
    pub(crate) fn snapshot(&self) -> Vec<TradeEvent> {
        self.trades.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testutil::trade;

    #[test]
    fn test_never_exceeds_cap_and_stays_newest_first() {
        let mut buffer = TradeBuffer::new(5);
        for i in 0..8 {
            buffer.push_front(trade("SOL", i));
        }
        assert_eq!(buffer.len(), 5);
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot[0].timestamp, 7);
        assert_eq!(snapshot[4].timestamp, 3);
    }

    #[test]
    fn test_short_sequences_keep_every_trade() {
        let mut buffer = TradeBuffer::new(5);
        for i in 0..3 {
            buffer.push_front(trade("SOL", i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot()[0].timestamp, 2);
    }

    #[test]
    fn test_replace_is_wholesale_and_clamped() {
        let mut buffer = TradeBuffer::new(2);
        buffer.push_front(trade("OLD", 0));
        buffer.replace(vec![trade("A", 3), trade("B", 2), trade("C", 1)]);
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].coin_symbol, "A");
        assert_eq!(snapshot[1].coin_symbol, "B");
    }

    #[test]
    fn test_clear() {
        let mut buffer = TradeBuffer::new(5);
        buffer.push_front(trade("SOL", 1));
        buffer.clear();
        assert_eq!(buffer.len(), 0);
    }
}

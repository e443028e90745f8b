//! Running (cumulative) delta within a candle.
//!
//! Walks a candle's trades in time order accumulating signed volume and
//! tracks the extremes the running sum reaches.

use orderflow_core::Trade;
use serde::{Deserialize, Serialize};

/// Extremes of the running delta over a trade slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningDelta {
    /// Lowest cumulative delta reached.
    pub min_delta: f64,
    /// Highest cumulative delta reached.
    pub max_delta: f64,
    /// Cumulative delta after the last trade.
    pub final_delta: f64,
}

/// Accumulator for the running delta.
#[derive(Debug, Clone, Default)]
pub struct RunningDeltaTracker {
    cumulative: f64,
    min: Option<f64>,
    max: Option<f64>,
    trade_count: u64,
}

impl RunningDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trade: buys push the sum up, sells push it down.
    pub fn add_trade(&mut self, trade: &Trade) {
        self.cumulative += trade.signed_amount();
        self.min = Some(self.min.map_or(self.cumulative, |m| m.min(self.cumulative)));
        self.max = Some(self.max.map_or(self.cumulative, |m| m.max(self.cumulative)));
        self.trade_count += 1;
    }

    /// Add multiple trades, in time order.
    pub fn add_trades(&mut self, trades: &[Trade]) {
        for trade in trades {
            self.add_trade(trade);
        }
    }

    /// Current cumulative delta.
    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }

    /// Get the number of trades seen.
    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    /// Extremes so far. Both are 0 before the first trade.
    pub fn extremes(&self) -> RunningDelta {
        RunningDelta {
            min_delta: self.min.unwrap_or(0.0),
            max_delta: self.max.unwrap_or(0.0),
            final_delta: self.cumulative,
        }
    }

    /// Clear all data.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Running-delta extremes of a time-ordered trade slice.
pub fn running_delta(trades: &[Trade]) -> RunningDelta {
    let mut tracker = RunningDeltaTracker::new();
    tracker.add_trades(trades);
    tracker.extremes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::{ts_to_datetime, TradeKind, TradeSide};

    fn make_trade(ts_ms: i64, side: TradeSide, amount: f64) -> Trade {
        Trade {
            timestamp: ts_ms,
            id: ts_ms.to_string(),
            kind: TradeKind::Market,
            side,
            price: 50000.0,
            amount,
            cost: 50000.0 * amount,
            time: ts_to_datetime(ts_ms).unwrap(),
        }
    }

    #[test]
    fn test_empty() {
        let rd = running_delta(&[]);
        assert_eq!(rd, RunningDelta::default());
    }

    #[test]
    fn test_swing() {
        let trades = vec![
            make_trade(1, TradeSide::Buy, 1.0),  // 1
            make_trade(2, TradeSide::Sell, 3.0), // -2
            make_trade(3, TradeSide::Buy, 5.0),  // 3
            make_trade(4, TradeSide::Sell, 1.0), // 2
        ];
        let rd = running_delta(&trades);

        assert!((rd.min_delta - (-2.0)).abs() < 1e-10);
        assert!((rd.max_delta - 3.0).abs() < 1e-10);
        assert!((rd.final_delta - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_one_sided() {
        // All buys: the running sum never touches zero
        let trades = vec![
            make_trade(1, TradeSide::Buy, 0.5),
            make_trade(2, TradeSide::Buy, 0.25),
        ];
        let rd = running_delta(&trades);

        assert!((rd.min_delta - 0.5).abs() < 1e-10);
        assert!((rd.max_delta - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_order_matters_for_extremes() {
        let a = vec![
            make_trade(1, TradeSide::Buy, 2.0),
            make_trade(2, TradeSide::Sell, 2.0),
        ];
        let b = vec![
            make_trade(1, TradeSide::Sell, 2.0),
            make_trade(2, TradeSide::Buy, 2.0),
        ];
        let (ra, rb) = (running_delta(&a), running_delta(&b));

        // Same net delta, different swing
        assert_eq!(ra.final_delta, rb.final_delta);
        assert_eq!(ra.max_delta, 2.0);
        assert_eq!(rb.min_delta, -2.0);
    }

    #[test]
    fn test_tracker_incremental() {
        let mut tracker = RunningDeltaTracker::new();
        tracker.add_trade(&make_trade(1, TradeSide::Sell, 1.0));
        assert_eq!(tracker.cumulative(), -1.0);
        tracker.add_trade(&make_trade(2, TradeSide::Buy, 4.0));
        assert_eq!(tracker.cumulative(), 3.0);
        assert_eq!(tracker.trade_count(), 2);

        tracker.clear();
        assert_eq!(tracker.trade_count(), 0);
        assert_eq!(tracker.extremes(), RunningDelta::default());
    }
}

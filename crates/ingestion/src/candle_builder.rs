//! OHLCV candle building from trades.
//!
//! Buckets trades by timeframe and produces the candle series that trades
//! are later assigned to.

use orderflow_core::{ts_to_datetime, Candle, Error, Result, Timeframe, TimestampMs, Trade};
use std::collections::BTreeMap;

/// Builder for candles of a fixed timeframe.
pub struct CandleBuilder {
    timeframe: Timeframe,
    /// Candles being built, keyed by bucket start.
    candles: BTreeMap<TimestampMs, CandleInProgress>,
}

/// A candle that's currently being built.
#[derive(Debug, Clone)]
struct CandleInProgress {
    bucket_start: TimestampMs,
    open: Option<f64>,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CandleInProgress {
    fn new(bucket_start: TimestampMs) -> Self {
        Self {
            bucket_start,
            open: None,
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            close: 0.0,
            volume: 0.0,
        }
    }

    fn add_trade(&mut self, price: f64, amount: f64) {
        if self.open.is_none() {
            self.open = Some(price);
        }
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += amount;
    }

    fn to_candle(&self) -> Option<Candle> {
        Some(Candle {
            date: ts_to_datetime(self.bucket_start)?,
            open: self.open?,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

impl CandleBuilder {
    /// Create a new candle builder.
    pub fn new(timeframe: Timeframe) -> Result<Self> {
        if timeframe.as_millis() <= 0 {
            return Err(Error::config(format!(
                "timeframe must be positive, got {}ms",
                timeframe.as_millis()
            )));
        }
        Ok(Self {
            timeframe,
            candles: BTreeMap::new(),
        })
    }

    /// Add a trade. Trades must arrive in time order within each bucket for
    /// open/close to be meaningful.
    pub fn add_trade(&mut self, trade: &Trade) {
        let bucket = self.timeframe.bucket_start(trade.time.timestamp_millis());

        self.candles
            .entry(bucket)
            .or_insert_with(|| CandleInProgress::new(bucket))
            .add_trade(trade.price, trade.amount);
    }

    /// Add multiple trades.
    pub fn add_trades(&mut self, trades: &[Trade]) {
        for trade in trades {
            self.add_trade(trade);
        }
    }

    /// Finalize every candle.
    pub fn finish(self) -> Vec<Candle> {
        self.candles
            .values()
            .filter_map(CandleInProgress::to_candle)
            .collect()
    }
}

/// Build the full candle series for a trade sequence.
///
/// Buckets without trades are not emitted.
pub fn build_candles(trades: &[Trade], timeframe: Timeframe) -> Result<Vec<Candle>> {
    let mut builder = CandleBuilder::new(timeframe)?;
    builder.add_trades(trades);
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use orderflow_core::{TradeKind, TradeSide};

    fn make_trade(ts_ms: i64, price: f64, amount: f64) -> Trade {
        Trade {
            timestamp: ts_ms,
            id: ts_ms.to_string(),
            kind: TradeKind::Market,
            side: TradeSide::Buy,
            price,
            amount,
            cost: price * amount,
            time: ts_to_datetime(ts_ms).unwrap(),
        }
    }

    fn one_minute() -> Timeframe {
        "1m".parse().unwrap()
    }

    #[test]
    fn test_single_trade() {
        let candles = build_candles(&[make_trade(60_000 + 30_000, 50000.5, 0.1)], one_minute()).unwrap();

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].date.timestamp_millis(), 60_000);
        assert_abs_diff_eq!(candles[0].open, 50000.5);
        assert_abs_diff_eq!(candles[0].close, 50000.5);
        assert_abs_diff_eq!(candles[0].volume, 0.1);
    }

    #[test]
    fn test_multiple_trades_same_candle() {
        let trades = vec![
            make_trade(60_000 + 10_000, 50000.0, 0.1), // Open
            make_trade(60_000 + 20_000, 50005.0, 0.2), // High
            make_trade(60_000 + 30_000, 49995.0, 0.1), // Low
            make_trade(60_000 + 50_000, 50001.0, 0.1), // Close
        ];
        let candles = build_candles(&trades, one_minute()).unwrap();

        assert_eq!(candles.len(), 1);
        assert!((candles[0].open - 50000.0).abs() < 1e-10);
        assert!((candles[0].high - 50005.0).abs() < 1e-10);
        assert!((candles[0].low - 49995.0).abs() < 1e-10);
        assert!((candles[0].close - 50001.0).abs() < 1e-10);
        assert!((candles[0].volume - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_gaps_not_filled() {
        let trades = vec![
            make_trade(60_000 + 1_000, 100.0, 1.0),
            make_trade(240_000 + 1_000, 101.0, 1.0),
        ];
        let candles = build_candles(&trades, one_minute()).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].date.timestamp_millis(), 60_000);
        assert_eq!(candles[1].date.timestamp_millis(), 240_000);
    }

    #[test]
    fn test_five_minute_buckets() {
        let tf: Timeframe = "5m".parse().unwrap();
        let trades = vec![
            make_trade(0, 100.0, 1.0),
            make_trade(299_999, 102.0, 1.0),
            make_trade(300_000, 103.0, 1.0),
        ];
        let candles = build_candles(&trades, tf).unwrap();

        assert_eq!(candles.len(), 2);
        assert!((candles[0].close - 102.0).abs() < 1e-10);
        assert!((candles[1].open - 103.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_timeframe_rejected() {
        assert!(CandleBuilder::new(Timeframe::from_millis(0)).is_err());
    }
}

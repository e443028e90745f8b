//! Candle window assignment.
//!
//! Partitions a time-sorted trade sequence into one slice per candle. A trade
//! belongs to candle `i` when `candles[i].date <= trade.time < candles[i + 1].date`;
//! the last candle's window is open-ended.

use orderflow_core::{Candle, Error, Result, Trade};
use tracing::debug;

/// Trades split by candle window.
///
/// Slices borrow from the trade sequence passed to [`assign`]; nothing is
/// copied.
#[derive(Debug, Clone)]
pub struct Assignment<'a> {
    slices: Vec<&'a [Trade]>,
    dropped: usize,
}

impl<'a> Assignment<'a> {
    /// Number of candle windows.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Trades for candle `i`.
    pub fn get(&self, i: usize) -> Option<&'a [Trade]> {
        self.slices.get(i).copied()
    }

    /// Slices in candle order.
    pub fn slices(&self) -> &[&'a [Trade]] {
        &self.slices
    }

    /// Trades that precede the first candle.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Trades assigned to some candle.
    pub fn assigned(&self) -> usize {
        self.slices.iter().map(|s| s.len()).sum()
    }

    pub fn into_slices(self) -> Vec<&'a [Trade]> {
        self.slices
    }
}

/// Check that candle dates are strictly increasing.
pub fn check_candle_order(candles: &[Candle]) -> Result<()> {
    for (i, pair) in candles.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(Error::ordering(
                "candles",
                i + 1,
                format!(
                    "date {} is not after previous candle {}",
                    pair[1].date, pair[0].date
                ),
            ));
        }
    }
    Ok(())
}

/// Check that trade times never decrease.
pub fn check_trade_order(trades: &[Trade]) -> Result<()> {
    for (i, pair) in trades.windows(2).enumerate() {
        if pair[1].time < pair[0].time {
            return Err(Error::ordering(
                "trades",
                i + 1,
                format!(
                    "trade {} at {} precedes trade {} at {}",
                    pair[1].id, pair[1].time, pair[0].id, pair[0].time
                ),
            ));
        }
    }
    Ok(())
}

/// Assign trades to candle windows.
///
/// Both inputs must already be sorted ascending; unsorted input is an
/// [`Error::OrderingViolation`] rather than being re-sorted. Trades before
/// the first candle are dropped.
pub fn assign<'a>(candles: &[Candle], trades: &'a [Trade]) -> Result<Assignment<'a>> {
    check_candle_order(candles)?;
    check_trade_order(trades)?;

    let Some(first) = candles.first() else {
        return Ok(Assignment {
            slices: Vec::new(),
            dropped: trades.len(),
        });
    };

    let n = trades.len();
    let mut start = 0;
    while start < n && trades[start].time < first.date {
        start += 1;
    }
    let dropped = start;

    let mut slices = Vec::with_capacity(candles.len());
    for i in 0..candles.len() {
        let end = match candles.get(i + 1) {
            Some(next) => {
                let mut end = start;
                while end < n && trades[end].time < next.date {
                    end += 1;
                }
                end
            }
            None => n,
        };
        slices.push(&trades[start..end]);
        start = end;
    }

    debug!(
        candles = candles.len(),
        assigned = n - dropped,
        dropped,
        "assigned trades to candles"
    );

    Ok(Assignment { slices, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::{ts_to_datetime, TradeKind, TradeSide};

    fn make_candle(ts_ms: i64) -> Candle {
        Candle {
            date: ts_to_datetime(ts_ms).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            volume: 10.0,
        }
    }

    fn make_trade(ts_ms: i64, id: &str) -> Trade {
        Trade {
            timestamp: ts_ms,
            id: id.to_string(),
            kind: TradeKind::Market,
            side: TradeSide::Buy,
            price: 100.0,
            amount: 1.0,
            cost: 100.0,
            time: ts_to_datetime(ts_ms).unwrap(),
        }
    }

    fn ids(trades: &[Trade]) -> Vec<&str> {
        trades.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_window_boundaries() {
        let candles = vec![make_candle(60_000), make_candle(120_000), make_candle(180_000)];
        let trades = vec![
            make_trade(30_000, "early"),
            make_trade(60_000, "a"),
            make_trade(119_999, "b"),
            make_trade(120_000, "c"),
            make_trade(500_000, "d"),
        ];

        let assignment = assign(&candles, &trades).unwrap();

        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.dropped(), 1);
        assert_eq!(ids(assignment.get(0).unwrap()), vec!["a", "b"]);
        assert_eq!(ids(assignment.get(1).unwrap()), vec!["c"]);
        // Last window is open-ended
        assert_eq!(ids(assignment.get(2).unwrap()), vec!["d"]);
        assert_eq!(assignment.assigned() + assignment.dropped(), trades.len());
    }

    #[test]
    fn test_empty_windows() {
        let candles = vec![make_candle(60_000), make_candle(120_000), make_candle(180_000)];
        let trades = vec![make_trade(190_000, "x")];

        let assignment = assign(&candles, &trades).unwrap();
        assert!(assignment.get(0).unwrap().is_empty());
        assert!(assignment.get(1).unwrap().is_empty());
        assert_eq!(assignment.get(2).unwrap().len(), 1);
    }

    #[test]
    fn test_no_candles_drops_everything() {
        let trades = vec![make_trade(1_000, "a"), make_trade(2_000, "b")];
        let assignment = assign(&[], &trades).unwrap();
        assert!(assignment.is_empty());
        assert_eq!(assignment.dropped(), 2);
    }

    #[test]
    fn test_unsorted_candles_rejected() {
        let candles = vec![make_candle(120_000), make_candle(60_000)];
        match assign(&candles, &[]) {
            Err(Error::OrderingViolation { series, index, .. }) => {
                assert_eq!(series, "candles");
                assert_eq!(index, 1);
            }
            other => panic!("expected ordering violation, got {other:?}"),
        }

        let duplicate = vec![make_candle(60_000), make_candle(60_000)];
        assert!(assign(&duplicate, &[]).is_err());
    }

    #[test]
    fn test_unsorted_trades_rejected() {
        let candles = vec![make_candle(60_000)];
        let trades = vec![
            make_trade(70_000, "a"),
            make_trade(90_000, "b"),
            make_trade(80_000, "c"),
        ];
        match assign(&candles, &trades) {
            Err(Error::OrderingViolation { series, index, .. }) => {
                assert_eq!(series, "trades");
                assert_eq!(index, 2);
            }
            other => panic!("expected ordering violation, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_trade_times_allowed() {
        let candles = vec![make_candle(60_000)];
        let trades = vec![make_trade(70_000, "a"), make_trade(70_000, "b")];
        let assignment = assign(&candles, &trades).unwrap();
        assert_eq!(assignment.assigned(), 2);
    }
}

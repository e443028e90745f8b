//! Raw trade feed normalization.
//!
//! Turns loosely-typed exchange trade records into canonical [`Trade`]s,
//! sorted ascending by time with validated side and order type.

use chrono::{DateTime, Utc};
use orderflow_core::{ts_to_datetime, Error, Result, Trade, TradeKind, TradeSide};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// A trade record as delivered by the exchange or storage layer.
///
/// Every column is optional here; the normalizer decides which ones are
/// required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTrade {
    pub timestamp: Option<i64>,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub side: Option<String>,
    pub price: Option<f64>,
    pub amount: Option<f64>,
    pub cost: Option<f64>,
    pub date: Option<DateTime<Utc>>,
}

/// Statistics about a normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizationStats {
    /// Raw records seen.
    pub rows_seen: u64,
    /// Canonical trades emitted.
    pub trades_emitted: u64,
    /// Records dropped as `(timestamp, id)` duplicates.
    pub duplicates_dropped: u64,
    /// Buy-initiated trades emitted.
    pub buy_trades: u64,
    /// Sell-initiated trades emitted.
    pub sell_trades: u64,
    /// Buy volume emitted.
    pub buy_volume: f64,
    /// Sell volume emitted.
    pub sell_volume: f64,
}

impl NormalizationStats {
    /// Fraction of emitted volume that was buy-initiated.
    pub fn buy_frac(&self) -> f64 {
        let total = self.buy_volume + self.sell_volume;
        if total > 0.0 {
            self.buy_volume / total
        } else {
            0.0
        }
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Normalizer for raw trade feeds.
pub struct TradeNormalizer {
    /// Drop repeated `(timestamp, id)` records.
    dedup: bool,
    stats: NormalizationStats,
}

impl TradeNormalizer {
    /// Create a normalizer with duplicate removal enabled.
    pub fn new() -> Self {
        Self {
            dedup: true,
            stats: NormalizationStats::default(),
        }
    }

    /// Enable or disable duplicate removal.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    /// Validate a single raw record.
    ///
    /// `index` is the record's position in the feed and is only used for
    /// error reporting.
    pub fn normalize_record(&self, index: usize, raw: &RawTrade) -> Result<Trade> {
        let id = raw
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::malformed_trade(index, None, "missing column 'id'"))?;
        let fail = |reason: String| Error::malformed_trade(index, Some(id), reason);

        let timestamp = raw
            .timestamp
            .ok_or_else(|| fail("missing column 'timestamp'".to_string()))?;
        let side: TradeSide = raw
            .side
            .as_deref()
            .ok_or_else(|| fail("missing column 'side'".to_string()))?
            .parse()
            .map_err(fail)?;
        let kind: TradeKind = match raw.kind.as_deref() {
            Some(kind) => kind.parse().map_err(fail)?,
            None => TradeKind::Unspecified,
        };

        let price = raw
            .price
            .ok_or_else(|| fail("missing column 'price'".to_string()))?;
        if !price.is_finite() {
            return Err(fail(format!("price must be finite, got {price}")));
        }
        let amount = raw
            .amount
            .ok_or_else(|| fail("missing column 'amount'".to_string()))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(fail(format!("amount must be > 0, got {amount}")));
        }

        let time = match raw.date {
            Some(date) => date,
            None => ts_to_datetime(timestamp)
                .ok_or_else(|| fail(format!("timestamp {timestamp} out of range")))?,
        };

        Ok(Trade {
            timestamp,
            id: id.to_string(),
            kind,
            side,
            price,
            amount,
            cost: raw.cost.unwrap_or(price * amount),
            time,
        })
    }

    /// Normalize a whole feed.
    ///
    /// The output is sorted ascending by time; trades sharing an instant keep
    /// their feed order. Fails on the first malformed record.
    pub fn normalize(&mut self, raw: &[RawTrade]) -> Result<Vec<Trade>> {
        let mut trades = raw
            .iter()
            .enumerate()
            .map(|(index, record)| self.normalize_record(index, record))
            .collect::<Result<Vec<_>>>()?;

        // Stable: same-instant trades stay in feed order
        trades.sort_by_key(|t| t.time);

        let before = trades.len();
        if self.dedup {
            let mut seen = HashSet::with_capacity(trades.len());
            trades.retain(|t| seen.insert((t.timestamp, t.id.clone())));
        }
        let duplicates = (before - trades.len()) as u64;

        self.stats.rows_seen += raw.len() as u64;
        self.stats.trades_emitted += trades.len() as u64;
        self.stats.duplicates_dropped += duplicates;
        for trade in &trades {
            match trade.side {
                TradeSide::Buy => {
                    self.stats.buy_trades += 1;
                    self.stats.buy_volume += trade.amount;
                }
                TradeSide::Sell => {
                    self.stats.sell_trades += 1;
                    self.stats.sell_volume += trade.amount;
                }
            }
        }

        if duplicates > 0 {
            debug!(duplicates, "dropped duplicate trades");
        }
        info!(rows = raw.len(), trades = trades.len(), "normalized trade feed");

        Ok(trades)
    }

    /// Decode a JSON array of trade records and normalize it.
    pub fn from_json(&mut self, json: &str) -> Result<Vec<Trade>> {
        let raw: Vec<RawTrade> = serde_json::from_str(json)?;
        self.normalize(&raw)
    }

    /// Get normalization statistics.
    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

impl Default for TradeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

//! Core data types for the order-flow engine.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Price type with ordering support.
pub type Price = OrderedFloat<f64>;

/// Size/quantity type.
pub type Size = f64;

/// Aggressor side of a trade.
///
/// Buy-initiated trades lift the ask and count as ask volume; sell-initiated
/// trades hit the bid and count as bid volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i8)]
pub enum TradeSide {
    /// Buyer-initiated (ask volume).
    Buy = 1,
    /// Seller-initiated (bid volume).
    Sell = -1,
}

impl TradeSide {
    /// Get the sign as f64.
    #[inline]
    pub fn sign_f64(self) -> f64 {
        self as i8 as f64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(format!("unknown trade side '{other}'")),
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type that produced the trade, as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Market,
    Limit,
    /// The exchange did not report an order type.
    Unspecified,
}

impl TradeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeKind::Market => "market",
            TradeKind::Limit => "limit",
            TradeKind::Unspecified => "",
        }
    }
}

impl FromStr for TradeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "market" => Ok(TradeKind::Market),
            "limit" => Ok(TradeKind::Limit),
            "" => Ok(TradeKind::Unspecified),
            other => Err(format!("unknown trade type '{other}'")),
        }
    }
}

/// A single normalized trade (print) from the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Timestamp in milliseconds.
    pub timestamp: TimestampMs,
    /// Exchange trade id.
    pub id: String,
    /// Order type.
    #[serde(rename = "type")]
    pub kind: TradeKind,
    /// Aggressor side.
    pub side: TradeSide,
    /// Trade price.
    pub price: f64,
    /// Trade size (always > 0).
    pub amount: Size,
    /// Quote-currency cost.
    pub cost: f64,
    /// Trade instant.
    #[serde(rename = "date")]
    pub time: DateTime<Utc>,
}

impl Trade {
    /// Get signed size (positive for buy, negative for sell).
    #[inline]
    pub fn signed_amount(&self) -> f64 {
        self.amount * self.side.sign_f64()
    }
}

/// OHLCV candle over one timeframe bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start.
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Size,
}

/// One footprint row: trades aggregated at a single price bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBin {
    /// Lower edge of the bin (`min_price + index * scale`).
    pub price: f64,
    /// Number of sell-initiated trades in the bin.
    #[serde(rename = "bid")]
    pub bid_count: u64,
    /// Number of buy-initiated trades in the bin.
    #[serde(rename = "ask")]
    pub ask_count: u64,
    /// `ask_amount - bid_amount`.
    pub delta: f64,
    pub bid_amount: Size,
    pub ask_amount: Size,
    /// `bid_amount + ask_amount`.
    pub total_volume: Size,
    /// `bid_count + ask_count`.
    pub total_trades: u64,
}

/// Column names of a standalone volume profile, in output order.
pub const PROFILE_COLUMNS: [&str; 7] = [
    "bid",
    "ask",
    "delta",
    "bid_amount",
    "ask_amount",
    "total_volume",
    "total_trades",
];

/// A candle carrying its order-flow analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCandle {
    /// Input candle columns, unchanged.
    #[serde(flatten)]
    pub candle: Candle,
    /// Trades inside this candle's window, time ascending.
    pub trades: Vec<Trade>,
    /// Footprint, ascending by price.
    pub orderflow: Vec<PriceBin>,
    /// Total bid (sell-initiated) volume.
    pub bid: Size,
    /// Total ask (buy-initiated) volume.
    pub ask: Size,
    /// `ask - bid`.
    pub delta: f64,
    /// Lowest running cumulative delta within the candle.
    pub min_delta: f64,
    /// Highest running cumulative delta within the candle.
    pub max_delta: f64,
    pub total_trades: u64,
    /// Lowest price of the lowest bid-dominant stacked run, if any.
    pub stacked_imbalances_bid: Option<f64>,
    /// Lowest price of the lowest ask-dominant stacked run, if any.
    pub stacked_imbalances_ask: Option<f64>,
}

/// Column names of the enriched candle table, in output order.
pub const ENRICHED_COLUMNS: [&str; 16] = [
    "date",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "trades",
    "orderflow",
    "bid",
    "ask",
    "delta",
    "min_delta",
    "max_delta",
    "total_trades",
    "stacked_imbalances_bid",
    "stacked_imbalances_ask",
];

impl EnrichedCandle {
    /// An enriched candle for a window that saw no trades.
    pub fn empty(candle: Candle) -> Self {
        Self {
            candle,
            trades: Vec::new(),
            orderflow: Vec::new(),
            bid: 0.0,
            ask: 0.0,
            delta: 0.0,
            min_delta: 0.0,
            max_delta: 0.0,
            total_trades: 0,
            stacked_imbalances_bid: None,
            stacked_imbalances_ask: None,
        }
    }
}

/// Convert a millisecond timestamp to a UTC instant.
pub fn ts_to_datetime(ts_ms: TimestampMs) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
}

//! Volume profile (footprint) binning.
//!
//! Buckets trades into price bins of width `scale` anchored at the lowest
//! traded price, and aggregates bid/ask volume and trade counts per bin.

use orderflow_core::{Error, Price, PriceBin, Result, Size, Trade, TradeSide};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// Per-bin accumulator.
#[derive(Debug, Clone, Default)]
struct BinAccumulator {
    bid_amount: f64,
    ask_amount: f64,
    bid_count: u64,
    ask_count: u64,
}

impl BinAccumulator {
    fn add(&mut self, trade: &Trade) {
        match trade.side {
            TradeSide::Sell => {
                self.bid_amount += trade.amount;
                self.bid_count += 1;
            }
            TradeSide::Buy => {
                self.ask_amount += trade.amount;
                self.ask_count += 1;
            }
        }
    }

    fn to_bin(&self, price: f64) -> PriceBin {
        PriceBin {
            price,
            bid_count: self.bid_count,
            ask_count: self.ask_count,
            delta: self.ask_amount - self.bid_amount,
            bid_amount: self.bid_amount,
            ask_amount: self.ask_amount,
            total_volume: self.bid_amount + self.ask_amount,
            total_trades: self.bid_count + self.ask_count,
        }
    }
}

/// Volume profile over a fixed set of trades.
#[derive(Debug, Clone)]
pub struct VolumeProfile {
    /// Bin width.
    scale: f64,
    /// Lowest traded price; anchors bin 0.
    min_price: Option<f64>,
    /// Accumulators keyed by bin index.
    bins: BTreeMap<i64, BinAccumulator>,
}

impl VolumeProfile {
    /// Build a profile from a trade set.
    ///
    /// Bins are anchored at the lowest price in `trades`, so the whole set
    /// must be known up front. The result does not depend on trade order
    /// beyond floating-point summation order.
    pub fn from_trades(trades: &[Trade], scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::config(format!(
                "profile scale must be a positive number, got {scale}"
            )));
        }

        let min_price = trades
            .iter()
            .map(|t| OrderedFloat(t.price))
            .min()
            .map(|p: Price| p.0);

        let mut profile = Self {
            scale,
            min_price,
            bins: BTreeMap::new(),
        };
        for trade in trades {
            let key = profile.bin_key(trade.price);
            profile.bins.entry(key).or_default().add(trade);
        }

        Ok(profile)
    }

    /// Get the bin index for a price.
    fn bin_key(&self, price: f64) -> i64 {
        let min_price = self.min_price.unwrap_or(price);
        ((price - min_price) / self.scale).floor() as i64
    }

    /// Lower edge of bin `index`.
    fn bin_price(&self, index: i64) -> f64 {
        self.min_price.unwrap_or(0.0) + index as f64 * self.scale
    }

    /// Footprint rows ascending by price. Empty bins are not emitted.
    pub fn bins(&self) -> Vec<PriceBin> {
        self.bins
            .iter()
            .map(|(&index, acc)| acc.to_bin(self.bin_price(index)))
            .collect()
    }

    /// Bin width.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Lowest traded price, `None` for an empty profile.
    pub fn min_price(&self) -> Option<f64> {
        self.min_price
    }

    /// Get number of bins with volume.
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Total bid (sell-initiated) volume.
    pub fn bid_volume(&self) -> Size {
        self.bins.values().map(|b| b.bid_amount).sum()
    }

    /// Total ask (buy-initiated) volume.
    pub fn ask_volume(&self) -> Size {
        self.bins.values().map(|b| b.ask_amount).sum()
    }

    /// Total trade count.
    pub fn total_trades(&self) -> u64 {
        self.bins.values().map(|b| b.bid_count + b.ask_count).sum()
    }
}

/// Standalone volume profile over an arbitrary trade set.
///
/// An empty trade set yields an empty profile.
pub fn profile(trades: &[Trade], scale: f64) -> Result<Vec<PriceBin>> {
    Ok(VolumeProfile::from_trades(trades, scale)?.bins())
}

//! Stacked imbalance detection over a footprint.
//!
//! A bin is imbalanced toward the bid when its bid volume is at least
//! `imbalance_volume` and at least `imbalance_ratio` percent of its ask
//! volume (symmetrically for the ask). A stacked imbalance is a run of at
//! least `stacked_imbalance_range` adjacent imbalanced rows. Adjacency is by
//! position in the footprint, so price gaps between populated bins do not
//! break a run.

use orderflow_core::{OrderFlowConfig, PriceBin};
use serde::{Deserialize, Serialize};

/// Side a bin's volume is dominated by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImbalanceSide {
    /// Sell-initiated volume dominates.
    Bid,
    /// Buy-initiated volume dominates.
    Ask,
}

/// A maximal run of adjacent imbalanced bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceRun {
    pub side: ImbalanceSide,
    /// Price of the lowest bin in the run.
    pub start_price: f64,
    /// Price of the highest bin in the run.
    pub end_price: f64,
    /// Number of bins in the run.
    pub len: usize,
}

/// Stacked imbalance levels reported for one candle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StackedImbalances {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
}

/// Detector for stacked imbalances.
#[derive(Debug, Clone)]
pub struct StackedImbalanceDetector {
    imbalance_volume: f64,
    /// Ratio as a multiplier (percent / 100).
    ratio: f64,
    min_run: usize,
}

impl StackedImbalanceDetector {
    /// Create a detector from a validated config.
    pub fn new(config: &OrderFlowConfig) -> Self {
        Self {
            imbalance_volume: config.imbalance_volume,
            ratio: config.imbalance_ratio / 100.0,
            min_run: config.stacked_imbalance_range.max(1),
        }
    }

    /// Whether `bin` is imbalanced toward `side`.
    #[inline]
    pub fn is_imbalanced(&self, bin: &PriceBin, side: ImbalanceSide) -> bool {
        let (dominant, opposite) = match side {
            ImbalanceSide::Bid => (bin.bid_amount, bin.ask_amount),
            ImbalanceSide::Ask => (bin.ask_amount, bin.bid_amount),
        };
        dominant >= self.imbalance_volume && dominant >= opposite * self.ratio
    }

    /// Every qualifying run on `side`, ascending by price.
    pub fn runs(&self, bins: &[PriceBin], side: ImbalanceSide) -> Vec<ImbalanceRun> {
        let mut runs = Vec::new();
        let mut start = 0;

        while start < bins.len() {
            if !self.is_imbalanced(&bins[start], side) {
                start += 1;
                continue;
            }
            let mut end = start + 1;
            while end < bins.len() && self.is_imbalanced(&bins[end], side) {
                end += 1;
            }
            let len = end - start;
            if len >= self.min_run {
                runs.push(ImbalanceRun {
                    side,
                    start_price: bins[start].price,
                    end_price: bins[end - 1].price,
                    len,
                });
            }
            start = end;
        }

        runs
    }

    /// Lowest price of the lowest qualifying run on `side`.
    ///
    /// Stops at the first run that reaches the minimum length.
    pub fn detect(&self, bins: &[PriceBin], side: ImbalanceSide) -> Option<f64> {
        let mut run = 0;
        for (i, bin) in bins.iter().enumerate() {
            if self.is_imbalanced(bin, side) {
                run += 1;
                if run >= self.min_run {
                    return Some(bins[i + 1 - run].price);
                }
            } else {
                run = 0;
            }
        }
        None
    }

    /// Run both scans.
    pub fn detect_both(&self, bins: &[PriceBin]) -> StackedImbalances {
        StackedImbalances {
            bid: self.detect(bins, ImbalanceSide::Bid),
            ask: self.detect(bins, ImbalanceSide::Ask),
        }
    }
}

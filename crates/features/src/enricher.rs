//! Candle enrichment engine.
//!
//! Combines trade assignment, footprint binning, running delta and stacked
//! imbalance detection into the enriched candle table.

use crate::{
    imbalance::StackedImbalanceDetector,
    profile::VolumeProfile,
    running_delta::running_delta,
};
use orderflow_core::{Candle, Config, EnrichedCandle, OrderFlowConfig, Result, Trade};
use orderflow_ingestion::{assign, RawTrade, TradeNormalizer};
use rayon::prelude::*;
use tracing::{debug, info};

/// Candle enrichment engine.
#[derive(Debug, Clone)]
pub struct CandleEnricher {
    /// Footprint configuration.
    config: OrderFlowConfig,
    /// Stacked imbalance detector.
    detector: StackedImbalanceDetector,
    /// Run the per-candle stage on the rayon pool.
    parallel: bool,
}

impl CandleEnricher {
    /// Create a new enricher. Fails if the configuration is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config: config.orderflow.clone(),
            detector: StackedImbalanceDetector::new(&config.orderflow),
            parallel: true,
        })
    }

    /// Enable or disable the parallel per-candle stage.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enrich a candle series with canonical, time-sorted trades.
    ///
    /// Output preserves input candle order. Trades before the first candle
    /// are dropped; unsorted candles or trades are an error.
    pub fn enrich(&self, candles: &[Candle], trades: &[Trade]) -> Result<Vec<EnrichedCandle>> {
        let assignment = assign(candles, trades)?;
        let slices = assignment.slices();

        let enriched = if self.parallel {
            candles
                .par_iter()
                .zip(slices.par_iter())
                .map(|(candle, window)| self.enrich_candle(candle, window))
                .collect::<Result<Vec<_>>>()?
        } else {
            candles
                .iter()
                .zip(slices.iter())
                .map(|(candle, window)| self.enrich_candle(candle, window))
                .collect::<Result<Vec<_>>>()?
        };

        info!(
            candles = candles.len(),
            trades = assignment.assigned(),
            dropped = assignment.dropped(),
            "enriched candles"
        );

        Ok(enriched)
    }

    /// Normalize a raw trade feed, then enrich.
    pub fn enrich_raw(&self, candles: &[Candle], raw: &[RawTrade]) -> Result<Vec<EnrichedCandle>> {
        let trades = TradeNormalizer::new().normalize(raw)?;
        self.enrich(candles, &trades)
    }

    /// Enrich a single candle with the trades of its window.
    pub fn enrich_candle(&self, candle: &Candle, trades: &[Trade]) -> Result<EnrichedCandle> {
        if trades.is_empty() {
            return Ok(EnrichedCandle::empty(candle.clone()));
        }

        let profile = VolumeProfile::from_trades(trades, self.config.scale)?;
        let orderflow = profile.bins();

        let bid: f64 = orderflow.iter().map(|b| b.bid_amount).sum();
        let ask: f64 = orderflow.iter().map(|b| b.ask_amount).sum();
        let extremes = running_delta(trades);
        let stacked = self.detector.detect_both(&orderflow);

        if stacked.bid.is_some() || stacked.ask.is_some() {
            debug!(
                date = %candle.date,
                bid = ?stacked.bid,
                ask = ?stacked.ask,
                "stacked imbalance"
            );
        }

        Ok(EnrichedCandle {
            candle: candle.clone(),
            trades: trades.to_vec(),
            total_trades: profile.total_trades(),
            orderflow,
            bid,
            ask,
            delta: ask - bid,
            min_delta: extremes.min_delta,
            max_delta: extremes.max_delta,
            stacked_imbalances_bid: stacked.bid,
            stacked_imbalances_ask: stacked.ask,
        })
    }

    /// Footprint configuration in use.
    pub fn config(&self) -> &OrderFlowConfig {
        &self.config
    }
}

/// Enrich `candles` with `trades` under `config`.
pub fn enrich(config: &Config, candles: &[Candle], trades: &[Trade]) -> Result<Vec<EnrichedCandle>> {
    CandleEnricher::new(config)?.enrich(candles, trades)
}

//! Order-flow feature computation.
//!
//! This crate handles:
//! - Volume profile (footprint) binning
//! - Running delta extremes
//! - Stacked imbalance detection
//! - Candle enrichment (the public entry point)

pub mod enricher;
pub mod imbalance;
pub mod profile;
pub mod running_delta;

pub use enricher::{enrich, CandleEnricher};
pub use imbalance::{ImbalanceRun, ImbalanceSide, StackedImbalanceDetector, StackedImbalances};
pub use profile::{profile, VolumeProfile};
pub use running_delta::{running_delta, RunningDelta, RunningDeltaTracker};

//! Data ingestion and normalization for the order-flow engine.
//!
//! This crate handles:
//! - Raw trade feed validation and sorting
//! - Candle building from trades
//! - Trade-to-candle window assignment

pub mod assigner;
pub mod candle_builder;
pub mod normalizer;

pub use assigner::{assign, Assignment};
pub use candle_builder::{build_candles, CandleBuilder};
pub use normalizer::{NormalizationStats, RawTrade, TradeNormalizer};

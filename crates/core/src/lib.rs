//! Core types and configuration for the order-flow engine.
//!
//! This crate provides shared types used across all other crates:
//! - Market data types (trades, candles, footprint rows, enriched candles)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, OrderFlowConfig, Timeframe};
pub use error::{Error, Result};
pub use types::*;

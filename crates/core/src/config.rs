//! Configuration structures for the order-flow engine.

use crate::error::{Error, Result};
use crate::types::TimestampMs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Candle bucket width.
    pub timeframe: Timeframe,
    /// Footprint / imbalance configuration.
    pub orderflow: OrderFlowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::from_millis(5 * 60_000),
            orderflow: OrderFlowConfig::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.timeframe.as_millis() <= 0 {
            return Err(Error::config(format!(
                "timeframe must be positive, got {}ms",
                self.timeframe.as_millis()
            )));
        }
        self.orderflow.validate()
    }
}

/// Footprint binning and stacked-imbalance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFlowConfig {
    /// Price-bin width.
    pub scale: f64,
    /// Minimum volume on the dominant side for a bin to count as imbalanced.
    pub imbalance_volume: f64,
    /// Minimum dominant/opposite volume ratio, in percent.
    pub imbalance_ratio: f64,
    /// Minimum number of consecutive imbalanced bins to report.
    pub stacked_imbalance_range: usize,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self {
            scale: 0.5,
            imbalance_volume: 0.0,
            imbalance_ratio: 300.0,
            stacked_imbalance_range: 3,
        }
    }
}

impl OrderFlowConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::config(format!(
                "orderflow.scale must be a positive number, got {}",
                self.scale
            )));
        }
        if !self.imbalance_volume.is_finite() || self.imbalance_volume < 0.0 {
            return Err(Error::config(format!(
                "orderflow.imbalance_volume must be >= 0, got {}",
                self.imbalance_volume
            )));
        }
        if !self.imbalance_ratio.is_finite() || self.imbalance_ratio <= 0.0 {
            return Err(Error::config(format!(
                "orderflow.imbalance_ratio must be > 0, got {}",
                self.imbalance_ratio
            )));
        }
        if self.stacked_imbalance_range < 1 {
            return Err(Error::config(
                "orderflow.stacked_imbalance_range must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Candle bucket width, written the exchange way (`"1m"`, `"5m"`, `"1h"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    millis: i64,
}

const UNITS: [(char, i64); 5] = [
    ('w', 7 * 86_400_000),
    ('d', 86_400_000),
    ('h', 3_600_000),
    ('m', 60_000),
    ('s', 1_000),
];

impl Timeframe {
    /// Create a timeframe from a width in milliseconds.
    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Bucket width in milliseconds.
    #[inline]
    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    /// Floor a timestamp to the start of its bucket.
    #[inline]
    pub fn bucket_start(&self, ts_ms: TimestampMs) -> TimestampMs {
        ts_ms.div_euclid(self.millis) * self.millis
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let unit = s
            .chars()
            .last()
            .ok_or_else(|| Error::config("empty timeframe"))?;
        let unit_ms = UNITS
            .iter()
            .find(|(u, _)| *u == unit)
            .map(|(_, ms)| *ms)
            .ok_or_else(|| Error::config(format!("unknown timeframe unit in '{s}'")))?;

        let amount: i64 = s[..s.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| Error::config(format!("invalid timeframe '{s}'")))?;
        if amount <= 0 {
            return Err(Error::config(format!("timeframe must be positive, got '{s}'")));
        }

        amount
            .checked_mul(unit_ms)
            .map(Self::from_millis)
            .ok_or_else(|| Error::config(format!("timeframe '{s}' is too large")))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Largest unit that divides the width exactly
        let (unit, ms) = UNITS
            .iter()
            .find(|(_, ms)| self.millis % ms == 0)
            .copied()
            .unwrap_or(('s', 1_000));
        if self.millis % ms == 0 {
            write!(f, "{}{}", self.millis / ms, unit)
        } else {
            write!(f, "{}ms", self.millis)
        }
    }
}

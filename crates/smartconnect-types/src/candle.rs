//! OHLCV candle representation.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One OHLCV bar as returned by the historical data endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time, with the exchange's UTC offset.
    pub time: DateTime<FixedOffset>,
    /// Opening price.
    pub open: Decimal,
    /// Highest price during the period.
    pub high: Decimal,
    /// Lowest price during the period.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Traded volume.
    pub volume: u64,
}

impl Candle {
    /// Creates a new candle.
    #[must_use]
    pub const fn new(
        time: DateTime<FixedOffset>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the bar open time as seconds since the Unix epoch.
    #[must_use]
    pub fn unix_time(&self) -> i64 {
        self.time.timestamp()
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Converts a price received as a JSON float into a decimal.
///
/// The float is rendered with its shortest round-trip representation before
/// parsing, so `2450.35` becomes exactly `2450.35` rather than the binary
/// expansion of the nearest double. Returns `None` for NaN, infinities and
/// values outside the decimal range.
#[must_use]
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok()
}

/// Converts a decimal price back into the nearest `f64`.
///
/// Inverse of [`decimal_from_f64`]: a value that came from a double converts
/// back to that same double.
#[must_use]
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(f64::NAN)
}

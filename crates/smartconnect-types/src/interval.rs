//! Candle interval definitions and their request range limits.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle granularity accepted by the historical data endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interval {
    /// 1-minute candles.
    OneMinute,
    /// 3-minute candles.
    ThreeMinute,
    /// 5-minute candles.
    FiveMinute,
    /// 10-minute candles.
    TenMinute,
    /// 15-minute candles.
    FifteenMinute,
    /// 30-minute candles.
    ThirtyMinute,
    /// 1-hour candles.
    OneHour,
    /// Daily candles.
    #[default]
    OneDay,
}

impl Interval {
    /// Returns the widest date range, in days, a single request may span.
    #[must_use]
    pub const fn max_days(&self) -> u32 {
        match self {
            Self::OneMinute => 30,
            Self::ThreeMinute => 60,
            Self::FiveMinute | Self::TenMinute => 100,
            Self::FifteenMinute | Self::ThirtyMinute => 200,
            Self::OneHour => 400,
            Self::OneDay => 2000,
        }
    }

    /// Returns the candle duration in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::OneMinute => 60,
            Self::ThreeMinute => 180,
            Self::FiveMinute => 300,
            Self::TenMinute => 600,
            Self::FifteenMinute => 900,
            Self::ThirtyMinute => 1800,
            Self::OneHour => 3600,
            Self::OneDay => 86400,
        }
    }

    /// Returns the wire identifier (e.g. `ONE_MINUTE`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "ONE_MINUTE",
            Self::ThreeMinute => "THREE_MINUTE",
            Self::FiveMinute => "FIVE_MINUTE",
            Self::TenMinute => "TEN_MINUTE",
            Self::FifteenMinute => "FIFTEEN_MINUTE",
            Self::ThirtyMinute => "THIRTY_MINUTE",
            Self::OneHour => "ONE_HOUR",
            Self::OneDay => "ONE_DAY",
        }
    }

    /// Returns all available intervals.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::OneMinute,
            Self::ThreeMinute,
            Self::FiveMinute,
            Self::TenMinute,
            Self::FifteenMinute,
            Self::ThirtyMinute,
            Self::OneHour,
            Self::OneDay,
        ]
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "one_minute" | "1m" | "m1" => Ok(Self::OneMinute),
            "three_minute" | "3m" | "m3" => Ok(Self::ThreeMinute),
            "five_minute" | "5m" | "m5" => Ok(Self::FiveMinute),
            "ten_minute" | "10m" | "m10" => Ok(Self::TenMinute),
            "fifteen_minute" | "15m" | "m15" => Ok(Self::FifteenMinute),
            "thirty_minute" | "30m" | "m30" => Ok(Self::ThirtyMinute),
            "one_hour" | "1h" | "h1" => Ok(Self::OneHour),
            "one_day" | "1d" | "d1" | "daily" => Ok(Self::OneDay),
            _ => Err(IntervalParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid interval string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(String);

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid interval '{}', expected one of: 1m, 3m, 5m, 10m, 15m, 30m, 1h, 1d",
            self.0
        )
    }
}

impl std::error::Error for IntervalParseError {}

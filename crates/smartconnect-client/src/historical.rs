//! Historical candle retrieval.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use smartconnect_types::{
    Candle, Exchange, Interval, RangeError, Result, decimal_from_f64,
};
use thiserror::Error;

use crate::client::SmartClient;
use crate::endpoint;
use crate::transport::Transport;

/// Date format the historical endpoint expects for `fromdate`/`todate`.
pub const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const SECONDS_PER_DAY: i64 = 86_400;

/// Parameters for a historical candle request.
///
/// `from` and `to` are exchange-local wall-clock times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    /// Exchange segment.
    pub exchange: Exchange,
    /// Instrument token (e.g. `"3045"` for SBIN on NSE).
    pub symbol_token: String,
    /// Candle interval.
    pub interval: Interval,
    /// Range start.
    pub from: NaiveDateTime,
    /// Range end.
    pub to: NaiveDateTime,
}

impl CandleRequest {
    /// Creates a candle request.
    #[must_use]
    pub fn new(
        exchange: Exchange,
        symbol_token: impl Into<String>,
        interval: Interval,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Self {
        Self {
            exchange,
            symbol_token: symbol_token.into(),
            interval,
            from,
            to,
        }
    }

    /// Returns the requested span in days, rounded up.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        let seconds = (self.to - self.from).num_seconds();
        seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
    }

    /// Checks the range against the interval's limit.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Inverted`] if `to` precedes `from`, or
    /// [`RangeError::Exceeded`] if the span is wider than
    /// [`Interval::max_days`].
    pub fn validate(&self) -> std::result::Result<(), RangeError> {
        if self.to < self.from {
            return Err(RangeError::Inverted {
                from: self.from,
                to: self.to,
            });
        }

        let days = self.span_days();
        let max_days = self.interval.max_days();
        if days > i64::from(max_days) {
            return Err(RangeError::Exceeded {
                interval: self.interval,
                days,
                max_days,
            });
        }
        Ok(())
    }

    fn body(&self) -> CandleBody<'_> {
        CandleBody {
            exchange: self.exchange,
            symboltoken: &self.symbol_token,
            interval: self.interval,
            fromdate: self.from.format(REQUEST_DATE_FORMAT).to_string(),
            todate: self.to.format(REQUEST_DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Serialize)]
struct CandleBody<'a> {
    exchange: Exchange,
    symboltoken: &'a str,
    interval: Interval,
    fromdate: String,
    todate: String,
}

impl<T: Transport> SmartClient<T> {
    /// Fetches historical candles.
    ///
    /// The range is validated before any request is made. Rows the server
    /// returns in an unexpected shape are logged and skipped, so the result
    /// contains only complete candles, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`smartconnect_types::SmartConnectError::Range`] for an invalid
    /// range, or the envelope as
    /// [`smartconnect_types::SmartConnectError::Api`] if the server rejects
    /// the request.
    pub async fn candles(&self, request: &CandleRequest) -> Result<Vec<Candle>> {
        request.validate()?;

        let body = serde_json::to_string(&request.body())?;
        let rows: Vec<Value> = self.call(&endpoint::CANDLE_DATA, Some(body)).await?;

        let candles = parse_candles(&rows);
        tracing::info!(
            exchange = %request.exchange,
            token = %request.symbol_token,
            interval = %request.interval,
            rows = rows.len(),
            candles = candles.len(),
            "fetched candles"
        );
        Ok(candles)
    }
}

/// Reasons a candle row is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// Row is not a JSON array.
    #[error("row is not an array")]
    NotAnArray,

    /// Row has the wrong number of fields.
    #[error("expected 6 fields, found {0}")]
    Arity(usize),

    /// Timestamp is not an RFC 3339 string with offset.
    #[error("invalid timestamp {0}")]
    Timestamp(String),

    /// A price or volume field is not a usable number.
    #[error("invalid {field}: {value}")]
    Number {
        /// Field name.
        field: &'static str,
        /// Offending JSON value.
        value: String,
    },
}

/// Parses a `[time, open, high, low, close, volume]` row.
///
/// # Errors
///
/// Returns a [`RowError`] describing the first problem found.
pub fn parse_candle_row(row: &Value) -> std::result::Result<Candle, RowError> {
    let fields = row.as_array().ok_or(RowError::NotAnArray)?;
    let [time, open, high, low, close, volume] = fields.as_slice() else {
        return Err(RowError::Arity(fields.len()));
    };

    let time = time
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .ok_or_else(|| RowError::Timestamp(time.to_string()))?;

    let volume = number(volume, "volume").and_then(|v| {
        if v < 0.0 {
            Err(RowError::Number {
                field: "volume",
                value: v.to_string(),
            })
        } else {
            // Truncation toward zero is intended.
            Ok(v as u64)
        }
    })?;

    Ok(Candle::new(
        time,
        price(open, "open")?,
        price(high, "high")?,
        price(low, "low")?,
        price(close, "close")?,
        volume,
    ))
}

/// Parses every row, dropping rows that fail [`parse_candle_row`].
#[must_use]
pub fn parse_candles(rows: &[Value]) -> Vec<Candle> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match parse_candle_row(row) {
            Ok(candle) => Some(candle),
            Err(reason) => {
                tracing::warn!(index, %reason, "skipping malformed candle row");
                None
            }
        })
        .collect()
}

fn number(value: &Value, field: &'static str) -> std::result::Result<f64, RowError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::Number {
            field,
            value: value.to_string(),
        })
}

fn price(value: &Value, field: &'static str) -> std::result::Result<Decimal, RowError> {
    number(value, field).and_then(|v| {
        decimal_from_f64(v).ok_or_else(|| RowError::Number {
            field,
            value: value.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SessionOptions;
    use crate::mock::{MockTransport, failure, success};
    use chrono::NaiveDate;
    use serde_json::json;
    use smartconnect_types::SmartConnectError;
    use std::str::FromStr;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn client(mock: &MockTransport) -> SmartClient<MockTransport> {
        SmartClient::new(
            mock.clone(),
            SessionOptions::new()
                .with_trade_key("trade-key")
                .with_history_key("history-key"),
        )
    }

    #[test]
    fn test_span_days_rounds_up() {
        let request = CandleRequest::new(
            Exchange::Nse,
            "3045",
            Interval::OneMinute,
            at(2023, 1, 1, 9, 15),
            at(2023, 1, 31, 9, 16),
        );
        assert_eq!(request.span_days(), 31);
        assert!(matches!(
            request.validate(),
            Err(RangeError::Exceeded { days: 31, max_days: 30, .. })
        ));
    }

    #[test]
    fn test_validate_at_limit() {
        let request = CandleRequest::new(
            Exchange::Nse,
            "3045",
            Interval::OneMinute,
            at(2023, 1, 1, 0, 0),
            at(2023, 1, 31, 0, 0),
        );
        assert_eq!(request.span_days(), 30);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_inverted() {
        let request = CandleRequest::new(
            Exchange::Nse,
            "3045",
            Interval::OneDay,
            at(2023, 1, 5, 0, 0),
            at(2023, 1, 1, 0, 0),
        );
        assert!(matches!(request.validate(), Err(RangeError::Inverted { .. })));
    }

    #[test]
    fn test_every_interval_rejects_one_day_over() {
        let from = at(2020, 1, 1, 0, 0);
        for interval in Interval::all() {
            let max = i64::from(interval.max_days());
            let ok = CandleRequest::new(
                Exchange::Nse,
                "3045",
                *interval,
                from,
                from + chrono::TimeDelta::days(max),
            );
            let over = CandleRequest::new(
                Exchange::Nse,
                "3045",
                *interval,
                from,
                from + chrono::TimeDelta::days(max) + chrono::TimeDelta::minutes(1),
            );
            assert!(ok.validate().is_ok(), "{interval} at limit");
            assert!(over.validate().is_err(), "{interval} over limit");
        }
    }

    #[tokio::test]
    async fn test_range_exceeded_issues_no_request() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let request = CandleRequest::new(
            Exchange::Nse,
            "3045",
            Interval::OneMinute,
            at(2023, 1, 1, 0, 0),
            at(2023, 3, 1, 0, 0),
        );

        let result = client.candles(&request).await;

        assert!(matches!(
            result,
            Err(SmartConnectError::Range(RangeError::Exceeded { days: 59, .. }))
        ));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_candles_request_and_parse() {
        let mock = MockTransport::new();
        mock.respond(
            &endpoint::CANDLE_DATA,
            success(json!([
                ["2023-01-02T00:00:00+05:30", 2450.35, 2460.0, 2445.1, 2458.75, 1523400.0],
                ["2023-01-03T00:00:00+05:30", 2458.75, 2470.5, 2451.0, 2466.2, 987654.9],
            ])),
        );
        let client = client(&mock);
        let request = CandleRequest::new(
            Exchange::Nse,
            "3045",
            Interval::OneDay,
            at(2023, 1, 1, 0, 0),
            at(2023, 1, 5, 0, 0),
        );

        let candles = client.candles(&request).await.unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, Decimal::from_str("2450.35").unwrap());
        assert_eq!(candles[0].low.to_string(), "2445.1");
        assert_eq!(candles[0].volume, 1_523_400);
        assert_eq!(candles[1].volume, 987_654);
        assert!(candles[0].time < candles[1].time);

        let sent = mock.last_request(&endpoint::CANDLE_DATA).unwrap();
        assert_eq!(sent.api_key, "history-key");
        let body: Value = serde_json::from_str(&sent.body.unwrap()).unwrap();
        assert_eq!(body["exchange"], "NSE");
        assert_eq!(body["symboltoken"], "3045");
        assert_eq!(body["interval"], "ONE_DAY");
        assert_eq!(body["fromdate"], "2023-01-01 00:00");
        assert_eq!(body["todate"], "2023-01-05 00:00");
    }

    #[tokio::test]
    async fn test_candles_api_failure() {
        let mock = MockTransport::new();
        mock.respond(&endpoint::CANDLE_DATA, failure("Invalid Token", "AG8001"));
        let client = client(&mock);
        let request = CandleRequest::new(
            Exchange::Nse,
            "3045",
            Interval::OneDay,
            at(2023, 1, 1, 0, 0),
            at(2023, 1, 5, 0, 0),
        );

        let result = client.candles(&request).await;
        assert_eq!(result.unwrap_err().api_error_code(), Some("AG8001"));
    }

    #[test]
    fn test_parse_candles_skips_malformed_rows() {
        let rows = vec![
            json!(["2023-01-02T09:15:00+05:30", 1.0, 2.0, 0.5, 1.5, 100.0]),
            json!({"unexpected": "object"}),
            json!(["2023-01-02T09:16:00+05:30", 1.0, 2.0, 0.5]),
            json!(["not a time", 1.0, 2.0, 0.5, 1.5, 100.0]),
            json!(["2023-01-02T09:18:00+05:30", "1.0", 2.0, 0.5, 1.5, 100.0]),
            json!(["2023-01-02T09:19:00+05:30", 1.0, 2.0, 0.5, 1.5, -5.0]),
            json!(["2023-01-02T09:20:00+05:30", 1.5, 2.5, 1.0, 2.0, 200.0]),
        ];

        let candles = parse_candles(&rows);

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].volume, 100);
        assert_eq!(candles[1].volume, 200);
    }

    #[test]
    fn test_parse_row_errors() {
        assert_eq!(parse_candle_row(&json!(null)), Err(RowError::NotAnArray));
        assert_eq!(parse_candle_row(&json!([])), Err(RowError::Arity(0)));
        assert!(matches!(
            parse_candle_row(&json!([1, 1.0, 1.0, 1.0, 1.0, 1.0])),
            Err(RowError::Timestamp(_))
        ));
        assert!(matches!(
            parse_candle_row(&json!(["2023-01-02T09:15:00+05:30", null, 1.0, 1.0, 1.0, 1.0])),
            Err(RowError::Number { field: "open", .. })
        ));
    }

    #[test]
    fn test_parse_row_integer_prices() {
        let candle =
            parse_candle_row(&json!(["2023-01-02T09:15:00+05:30", 100, 105, 99, 104, 42]))
                .unwrap();
        assert_eq!(candle.open, Decimal::from(100));
        assert_eq!(candle.volume, 42);
        assert_eq!(candle.time.offset().local_minus_utc(), 19_800);
    }
}

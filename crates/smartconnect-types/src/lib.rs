//! Core types for the smartconnect Angel One SmartAPI client.
//!
//! This crate provides the data structures shared by the other smartconnect
//! crates:
//!
//! - [`Session`] - Client code, API keys and session tokens
//! - [`Credentials`], [`TokenSet`], [`Profile`] - Login and profile payloads
//! - [`Envelope`] - The uniform `{status, message, errorcode, data}` wrapper
//! - [`Candle`] - One OHLCV bar with decimal prices
//! - [`Interval`] - Candle granularity and its request range limit
//! - [`Exchange`] - Exchange segment identifiers

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candle;
mod envelope;
mod error;
mod exchange;
mod interval;
mod session;

pub use candle::{Candle, decimal_from_f64, decimal_to_f64};
pub use envelope::Envelope;
pub use error::{ApiError, CacheError, RangeError, Result, SmartConnectError};
pub use exchange::{Exchange, ExchangeParseError};
pub use interval::{Interval, IntervalParseError};
pub use session::{Credentials, KeyScope, Profile, Session, TokenSet};

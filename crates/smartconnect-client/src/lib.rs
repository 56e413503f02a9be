//! HTTP transport, session bootstrap and historical data client for
//! Angel One SmartAPI.
//!
//! This crate provides the request pipeline:
//!
//! - [`endpoint`] - Fixed routes and the API key scope each one uses
//! - [`NetworkIdentity`] - Local IP, public IP and MAC address headers
//! - [`HttpTransport`] - reqwest transport implementing [`Transport`]
//! - [`TokenCache`] - JSON snapshot of the session on disk
//! - [`SmartClient`] - Session bootstrap, login, refresh, profile, candles
//! - [`cancellable`] - Abort an in-flight call from a caller signal

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod cancel;
mod client;
pub mod endpoint;
mod historical;
mod identity;
#[cfg(test)]
mod mock;
mod transport;

pub use cache::TokenCache;
pub use cancel::cancellable;
pub use client::{SessionOptions, SmartClient};
pub use historical::{CandleRequest, REQUEST_DATE_FORMAT, RowError, parse_candle_row, parse_candles};
pub use identity::{NetworkIdentity, PUBLIC_IP_URL};
pub use transport::{ApiRequest, ClientConfig, HttpTransport, Transport, api_headers};

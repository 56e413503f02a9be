//! Async Rust client for the Angel One SmartAPI.
//!
//! This is a facade crate that re-exports functionality from the smartconnect
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use smartconnect_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = SessionOptions::new()
//!         .with_trade_key("trade-key")
//!         .with_history_key("history-key")
//!         .with_credentials(Credentials::new("A123", "1234", "654321"))
//!         .with_cache_path("session.json");
//!     let client = SmartClient::connect(ClientConfig::default(), options).await?;
//!
//!     let request = CandleRequest::new(
//!         Exchange::Nse,
//!         "3045",
//!         Interval::OneMinute,
//!         "2023-01-02T09:15:00".parse()?,
//!         "2023-01-02T15:30:00".parse()?,
//!     );
//!     let candles = client.candles(&request).await?;
//!
//!     let parquet = ParquetFormatter::new().encode(&candles)?;
//!     std::fs::write("candles.parquet", parquet)?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use smartconnect_types::*;

#[cfg(feature = "client")]
pub use smartconnect_client::{
    ApiRequest, CandleRequest, ClientConfig, HttpTransport, NetworkIdentity, REQUEST_DATE_FORMAT,
    RowError, SessionOptions, SmartClient, TokenCache, Transport, cancellable, endpoint,
    parse_candles,
};

#[cfg(feature = "format")]
pub use smartconnect_format::{FormatError, Formatter, OutputFormat};

#[cfg(feature = "format")]
pub use smartconnect_format::{CsvFormatter, JsonFormatter, JsonStyle};

#[cfg(feature = "parquet")]
pub use smartconnect_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use smartconnect_lib::prelude::*;
/// ```
pub mod prelude {
    pub use smartconnect_types::{
        Candle, Credentials, Exchange, Interval, Profile, Result, Session, SmartConnectError,
        TokenSet,
    };

    #[cfg(feature = "client")]
    pub use smartconnect_client::{
        CandleRequest, ClientConfig, SessionOptions, SmartClient, cancellable,
    };

    #[cfg(feature = "format")]
    pub use smartconnect_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "parquet")]
    pub use smartconnect_format::ParquetFormatter;
}

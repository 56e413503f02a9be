//! Output formatters for historical candles.
//!
//! This crate provides formatters for writing [`Candle`] sequences
//! to various output formats:
//!
//! - [`CsvFormatter`] - CSV format
//! - [`JsonFormatter`] - JSON array or NDJSON format
//! - [`ParquetFormatter`] - Apache Parquet columnar format
//!
//! [`Candle`]: smartconnect_types::Candle

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(feature = "csv")]
mod csv;
mod formatter;
#[cfg(feature = "json")]
mod json;

#[cfg(feature = "parquet")]
mod parquet;

#[cfg(feature = "csv")]
pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
#[cfg(feature = "json")]
pub use json::{JsonFormatter, JsonStyle};

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetFormatter;

//! Display utilities and output formatting for the smartconnect CLI.

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use smartconnect_lib::prelude::*;
use smartconnect_lib::REQUEST_DATE_FORMAT;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output format for downloaded candles.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
            Format::Parquet => Self::Parquet,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self))
    }
}

/// Parses a range bound given as a date or a date and time.
///
/// A bare date at the end of a range means the end of that trading day.
pub(crate) fn parse_bound(s: &str, end_of_day: bool) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, REQUEST_DATE_FORMAT) {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s} (expected YYYY-MM-DD or \"YYYY-MM-DD HH:MM\")"))?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 0)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    };
    Ok(date.and_time(time.unwrap_or_default()))
}

/// Returns the default output file name for a candle download.
pub(crate) fn default_output(token: &str, interval: Interval, format: Format) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}.{}",
        token,
        interval.as_str().to_lowercase(),
        OutputFormat::from(format).extension()
    ))
}

/// Returns true if the path means standard output.
pub(crate) fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Write candles to a file, or stdout for `-`, in the specified format.
pub(crate) fn write_candles(candles: &[Candle], output: &Path, format: Format) -> Result<()> {
    if is_stdout(output) {
        if OutputFormat::from(format).is_binary() {
            bail!("Refusing to write {format} to stdout; pass --output <file>");
        }
        return encode(candles, BufWriter::new(std::io::stdout()), format);
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    encode(candles, BufWriter::new(file), format)
}

fn encode<W: Write + Send>(candles: &[Candle], writer: W, format: Format) -> Result<()> {
    match format {
        Format::Csv => CsvFormatter::new().write_candles(candles, writer)?,
        Format::Json => JsonFormatter::new().write_candles(candles, writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_candles(candles, writer)?,
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                ParquetFormatter::new().write_candles(candles, writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                let _ = writer;
                bail!("Parquet support not compiled in");
            }
        }
    }
    Ok(())
}

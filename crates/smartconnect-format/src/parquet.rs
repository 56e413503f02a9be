//! Apache Parquet output format.

use arrow::array::{Float64Array, Int64Array, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use smartconnect_types::{Candle, decimal_to_f64};
use std::io::Write;
use std::sync::Arc;

use crate::{FormatError, Formatter};

/// Parquet formatter for candles.
///
/// Every column is required; a candle sequence never produces nulls.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Codec applied to every column.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size. Zero is treated as one.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Returns the Arrow schema of the candle table.
    #[must_use]
    pub fn candle_schema() -> Schema {
        Schema::new(vec![
            Field::new("time", DataType::Int64, false),
            Field::new("open", DataType::Float64, false),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
            Field::new("volume", DataType::UInt32, false),
        ])
    }

    /// Encodes candles into an in-memory Parquet file.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::VolumeOverflow`] if a volume does not fit in
    /// 32 bits, or [`FormatError::Parquet`] if encoding fails.
    pub fn encode(&self, candles: &[Candle]) -> Result<Bytes, FormatError> {
        let mut buffer = Vec::new();
        self.write_candles(candles, &mut buffer)?;
        Ok(Bytes::from(buffer))
    }

    /// Converts candles to an Arrow RecordBatch. `offset` is the index of
    /// the first candle in the full input, for error reporting.
    fn candles_to_batch(candles: &[Candle], offset: usize) -> Result<RecordBatch, FormatError> {
        let times: Vec<_> = candles.iter().map(Candle::unix_time).collect();
        let opens: Vec<_> = candles.iter().map(|c| decimal_to_f64(c.open)).collect();
        let highs: Vec<_> = candles.iter().map(|c| decimal_to_f64(c.high)).collect();
        let lows: Vec<_> = candles.iter().map(|c| decimal_to_f64(c.low)).collect();
        let closes: Vec<_> = candles.iter().map(|c| decimal_to_f64(c.close)).collect();
        let volumes = candles
            .iter()
            .enumerate()
            .map(|(i, c)| {
                u32::try_from(c.volume).map_err(|_| FormatError::VolumeOverflow {
                    index: offset + i,
                    volume: c.volume,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        RecordBatch::try_new(
            Arc::new(Self::candle_schema()),
            vec![
                Arc::new(Int64Array::from(times)),
                Arc::new(Float64Array::from(opens)),
                Arc::new(Float64Array::from(highs)),
                Arc::new(Float64Array::from(lows)),
                Arc::new(Float64Array::from(closes)),
                Arc::new(UInt32Array::from(volumes)),
            ],
        )
        .map_err(|e| FormatError::Parquet(e.to_string()))
    }
}

impl Formatter for ParquetFormatter {
    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        writer: W,
    ) -> Result<(), FormatError> {
        let schema = Arc::new(Self::candle_schema());
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut arrow_writer = ArrowWriter::try_new(writer, schema, Some(props))
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        for (n, chunk) in candles.chunks(self.row_group_size).enumerate() {
            let batch = Self::candles_to_batch(chunk, n * self.row_group_size)?;
            arrow_writer
                .write(&batch)
                .map_err(|e| FormatError::Parquet(e.to_string()))?;
        }

        arrow_writer
            .close()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        Ok(())
    }

    fn extension(&self) -> &str {
        "parquet"
    }
}

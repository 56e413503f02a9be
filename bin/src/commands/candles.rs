//! Candles command implementation.
//!
//! Validates the requested range locally, establishes a session, fetches the
//! candles and writes them in the chosen format.

use anyhow::{Context, Result};
use smartconnect_lib::prelude::*;
use std::path::PathBuf;

use crate::AuthArgs;
use crate::display::{Format, default_output, is_stdout, parse_bound, write_candles};
use crate::session::{connect, interrupted, spinner};

/// Download candles for one instrument.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn candles(
    auth: &AuthArgs,
    exchange: Exchange,
    token: &str,
    interval: Interval,
    from: &str,
    to: &str,
    output: Option<PathBuf>,
    format: Format,
    quiet: bool,
) -> Result<()> {
    let request = CandleRequest::new(
        exchange,
        token,
        interval,
        parse_bound(from, false)?,
        parse_bound(to, true)?,
    );

    // Fail before any network traffic if the range is unusable.
    request.validate()?;

    let output = output.unwrap_or_else(|| default_output(token, interval, format));
    let client = connect(auth, false, quiet).await?;

    let pb = spinner("Fetching candles...", quiet);
    let result = cancellable(client.candles(&request), interrupted()).await;
    pb.finish_and_clear();
    let candles = result.with_context(|| {
        format!("Failed to fetch {interval} candles for {exchange}:{token}")
    })?;

    write_candles(&candles, &output, format)?;

    if !quiet && !is_stdout(&output) {
        eprintln!(
            "Wrote {} candles ({} {} -> {}) to: {}",
            candles.len(),
            interval,
            request.from.format("%Y-%m-%d %H:%M"),
            request.to.format("%Y-%m-%d %H:%M"),
            output.display()
        );
    }

    Ok(())
}

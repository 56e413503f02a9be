//! Caller-driven cancellation.

use smartconnect_types::{Result, SmartConnectError};
use std::future::Future;

/// Runs `operation` until it completes or `signal` resolves.
///
/// If the signal fires first the in-flight operation is dropped, which aborts
/// its request, and [`SmartConnectError::Cancelled`] is returned. Nothing is
/// retried or resumed.
///
/// # Errors
///
/// Returns the operation's own error, or [`SmartConnectError::Cancelled`].
///
/// # Example
///
/// ```ignore
/// let candles = cancellable(client.candles(&request), async {
///     let _ = tokio::signal::ctrl_c().await;
/// })
/// .await?;
/// ```
pub async fn cancellable<T, F, S>(operation: F, signal: S) -> Result<T>
where
    F: Future<Output = Result<T>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = signal => {
            tracing::debug!("operation cancelled");
            Err(SmartConnectError::Cancelled)
        }
        result = operation => result,
    }
}

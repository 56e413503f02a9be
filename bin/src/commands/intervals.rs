//! Intervals command implementation.

use smartconnect_lib::Interval;

/// Print every candle interval with its maximum request span.
pub(crate) fn list_intervals() {
    println!("{:<16} {:>10} {:>14}", "INTERVAL", "BAR (s)", "MAX DAYS/REQ");
    println!("{}", "-".repeat(42));
    for interval in Interval::all() {
        println!(
            "{:<16} {:>10} {:>14}",
            interval.as_str(),
            interval.seconds(),
            interval.max_days()
        );
    }
}

//! Ready-made retry policies.
//!
//! Pre-configured [`RetryOption`] values for the common situations, so
//! callers don't hand-assemble interval tables for every client. Each preset
//! is a starting point; rebuild with [`RetryOption::builder`] when the
//! defaults don't fit.

use crate::RetryOption;
use std::time::Duration;

const TRANSIENT_WAITS_MS: [u64; 3] = [100, 400, 1600];
const READ_WAITS_MS: [u64; 3] = [250, 1000, 4000];
const READ_RETRY_STATUS: [u16; 4] = [429, 502, 503, 504];
const READ_RETRY_METHODS: [&str; 2] = ["GET", "HEAD"];

fn waits(table: &[u64]) -> impl Iterator<Item = Duration> + '_ {
    table.iter().map(|ms| Duration::from_millis(*ms))
}

/// Transient-mode policy: retry timeouts, cancellations, and connection
/// failures, with a short exponential interval table (later retries clamp to
/// the last interval).
pub fn transient(retries: u32) -> RetryOption {
    RetryOption::builder()
        .retry_count(retries)
        .transient_error_retry(true)
        .wait_intervals(waits(&TRANSIENT_WAITS_MS))
        .build()
        .expect("preset policy is statically valid")
}

/// Status/method policy for idempotent reads: retry GET and HEAD on
/// 429/502/503/504 with a slower interval table.
pub fn idempotent_reads(retries: u32) -> RetryOption {
    RetryOption::builder()
        .retry_count(retries)
        .wait_intervals(waits(&READ_WAITS_MS))
        .retry_status_codes(READ_RETRY_STATUS)
        .retry_methods(READ_RETRY_METHODS)
        .build()
        .expect("preset policy is statically valid")
}

/// Retries disabled: every call is a single attempt.
pub fn single_attempt() -> RetryOption {
    RetryOption::default()
}

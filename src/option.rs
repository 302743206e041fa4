//! Retry policy configuration.
//!
//! [`RetryOption`] is an immutable policy value: how many retries, which
//! backoff interval before each one, the total execution budget, and which
//! outcomes are eligible. It is built once, validated, and then only read;
//! the processor never mutates it mid-run, so a single value can be shared
//! across any number of concurrent calls.
//!
//! Eligibility runs in one of two modes:
//! - **transient mode** (`transient_error_retry = true`): only attempts that
//!   failed with a transient transport error are retried;
//! - **status/method mode** (default): only attempts that completed with a
//!   response whose status code and request method both match the configured
//!   sets are retried.

use std::collections::HashSet;
use std::time::Duration;

/// Immutable retry policy for one logical request.
///
/// # Example
/// ```rust
/// use encore::RetryOption;
/// use std::time::Duration;
///
/// let option = RetryOption::builder()
///     .retry_count(3)
///     .wait_intervals([Duration::from_millis(100), Duration::from_millis(400)])
///     .total_timeout(Duration::from_secs(5))
///     .retry_status_codes([502, 503])
///     .retry_methods(["GET"])
///     .build()
///     .unwrap();
///
/// assert_eq!(option.retry_count(), 3);
/// // Indices past the interval table clamp to the last entry.
/// assert_eq!(option.wait_for(2), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryOption {
    retry_count: u32,
    wait_intervals: Vec<Duration>,
    total_timeout: Option<Duration>,
    transient_error_retry: bool,
    retry_status_codes: HashSet<u16>,
    retry_methods: HashSet<String>,
}

/// Errors produced while building a retry option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Retryable status codes must be within the HTTP range.
    #[error("status code {0} is outside the valid range (100-599)")]
    InvalidStatusCode(u16),
}

impl RetryOption {
    /// Construct a new builder. The default policy disables retries.
    pub fn builder() -> RetryOptionBuilder {
        RetryOptionBuilder::new()
    }

    /// Maximum number of retries; total attempts are `retry_count() + 1`.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// The configured backoff interval table.
    pub fn wait_intervals(&self) -> &[Duration] {
        &self.wait_intervals
    }

    /// Total execution budget. `None` means unbounded.
    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout
    }

    /// Whether eligibility is driven by transient transport errors rather
    /// than status-code/method matching.
    pub fn transient_error_retry(&self) -> bool {
        self.transient_error_retry
    }

    /// Status codes eligible for retry in status/method mode.
    pub fn retry_status_codes(&self) -> &HashSet<u16> {
        &self.retry_status_codes
    }

    /// Request methods eligible for retry in status/method mode.
    pub fn retry_methods(&self) -> &HashSet<String> {
        &self.retry_methods
    }

    /// Backoff to apply before retry `attempt` (0-based).
    ///
    /// Indices past the end of the interval table clamp to the last
    /// configured interval; an empty table waits zero.
    pub fn wait_for(&self, attempt: usize) -> Duration {
        match self.wait_intervals.last() {
            None => Duration::ZERO,
            Some(last) => *self.wait_intervals.get(attempt).unwrap_or(last),
        }
    }

    /// Whether `status` is in the retryable set.
    pub fn retries_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }

    /// Whether `method` is in the retryable set, ignoring ASCII case.
    /// An empty set matches nothing.
    pub fn retries_method(&self, method: &str) -> bool {
        self.retry_methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// Builder for [`RetryOption`].
#[derive(Debug, Clone, Default)]
pub struct RetryOptionBuilder {
    retry_count: u32,
    wait_intervals: Vec<Duration>,
    total_timeout: Option<Duration>,
    transient_error_retry: bool,
    retry_status_codes: HashSet<u16>,
    retry_methods: HashSet<String>,
}

impl RetryOptionBuilder {
    /// Create a builder with retries disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retries (attempts = retries + 1).
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the ordered backoff interval table.
    pub fn wait_intervals<I>(mut self, intervals: I) -> Self
    where
        I: IntoIterator<Item = Duration>,
    {
        self.wait_intervals = intervals.into_iter().collect();
        self
    }

    /// Set the total execution budget. `Duration::ZERO` means unbounded.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Drive eligibility by transient transport errors instead of
    /// status-code/method matching.
    pub fn transient_error_retry(mut self, enabled: bool) -> Self {
        self.transient_error_retry = enabled;
        self
    }

    /// Set the status codes eligible for retry in status/method mode.
    pub fn retry_status_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.retry_status_codes = codes.into_iter().collect();
        self
    }

    /// Set the request methods eligible for retry in status/method mode.
    pub fn retry_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.retry_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Build the policy, validating inputs.
    pub fn build(self) -> Result<RetryOption, BuildError> {
        if let Some(code) =
            self.retry_status_codes.iter().find(|c| !(100..=599).contains(*c))
        {
            return Err(BuildError::InvalidStatusCode(*code));
        }
        Ok(RetryOption {
            retry_count: self.retry_count,
            wait_intervals: self.wait_intervals,
            total_timeout: self.total_timeout,
            transient_error_retry: self.transient_error_retry,
            retry_status_codes: self.retry_status_codes,
            retry_methods: self.retry_methods,
        })
    }
}

//! Error taxonomy for retry execution.
//!
//! Two layers, matching the two places a failure can surface:
//!
//! - [`TransportError`] is what the transport seam reports for a single
//!   attempt (sending the request or reading a response body). Its
//!   [`is_transient`](TransportError::is_transient) classification drives
//!   transient-mode retry eligibility.
//! - [`RetryError`] is what attempt records and the final report carry. It
//!   wraps a transport failure, or marks the two terminal kinds that are not
//!   attempt failures: the global deadline expiring, and a best-effort body
//!   read failing after an otherwise successful attempt.
//!
//! Nothing in this crate returns these as an `Err` from processing; the
//! processor captures every failure into the report it hands back.

use std::time::Duration;

/// Failure of a single send attempt or body read, as reported by the
/// transport collaborator.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The attempt's own I/O timeout elapsed. Distinct from the global
    /// execution deadline, which is [`RetryError::DeadlineExceeded`].
    #[error("request timed out")]
    Timeout,
    /// The attempt was canceled below this crate (e.g. by the transport's
    /// own machinery).
    #[error("request was canceled")]
    Canceled,
    /// A connection-level failure: refused, reset, DNS, TLS.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other failure surfaced by the transport.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wrap an arbitrary transport failure.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }

    /// True for failures likely to succeed if retried unchanged: timeouts,
    /// cancellations, and connection-level failures.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Canceled | Self::Connect(_))
    }

    /// Check if this is a single-attempt timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Check if this is a cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Check if this is a connection-level failure.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}

/// Failure recorded against an attempt or the execution as a whole.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The attempt failed in the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The global execution deadline fired. Terminal: no further attempt or
    /// wait runs once this is raised, regardless of remaining retry budget.
    #[error("execution timed out after {elapsed:?} (budget: {budget:?})")]
    DeadlineExceeded {
        /// Wall-clock time since the original request was issued.
        elapsed: Duration,
        /// The configured total timeout.
        budget: Duration,
    },
    /// Reading the effective response's body failed. Best-effort: the
    /// response itself is still part of the report.
    #[error("failed to read response body: {0}")]
    Body(#[source] TransportError),
}

impl RetryError {
    /// Check if this is the global deadline expiring.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    /// Check if this wraps a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Borrow the transport failure if this wraps one.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Access deadline details as (elapsed, budget) if present.
    pub fn deadline_details(&self) -> Option<(Duration, Duration)> {
        match self {
            Self::DeadlineExceeded { elapsed, budget } => Some((*elapsed, *budget)),
            _ => None,
        }
    }
}

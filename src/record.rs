//! Per-attempt audit entries.

use crate::RetryError;
use std::time::Duration;

/// The immutable audit entry for one attempt.
///
/// Exactly one of `response`/`error` is populated: a settled send produces a
/// response, a failed one produces an error. The single exception is the
/// deadline-terminal record the processor appends when the global deadline
/// fires before any attempt settled; it carries the original request and the
/// deadline error.
///
/// Records are created when an attempt settles, appended to an append-only
/// list, and never mutated afterwards.
#[derive(Debug)]
pub struct AttemptRecord<Req, Resp> {
    request: Req,
    response: Option<Resp>,
    error: Option<RetryError>,
    duration: Duration,
}

impl<Req, Resp> AttemptRecord<Req, Resp> {
    pub(crate) fn success(request: Req, response: Resp, duration: Duration) -> Self {
        Self { request, response: Some(response), error: None, duration }
    }

    pub(crate) fn failure(request: Req, error: RetryError, duration: Duration) -> Self {
        Self { request, response: None, error: Some(error), duration }
    }

    /// The request instance sent for this attempt. Retry attempts carry an
    /// independent copy, never the prior attempt's instance.
    pub fn request(&self) -> &Req {
        &self.request
    }

    /// The response, if the send settled without an error.
    pub fn response(&self) -> Option<&Resp> {
        self.response.as_ref()
    }

    pub(crate) fn response_mut(&mut self) -> Option<&mut Resp> {
        self.response.as_mut()
    }

    /// The failure, if the attempt did not produce a response.
    pub fn error(&self) -> Option<&RetryError> {
        self.error.as_ref()
    }

    /// How long this attempt took.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether this attempt settled with a response.
    pub fn succeeded(&self) -> bool {
        self.response.is_some()
    }
}

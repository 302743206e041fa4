//! Aggregate execution reports.
//!
//! A [`RetryReport`] is everything the caller learns about one processed
//! request: the full chronological attempt trail, the effective outcome
//! reduced from it, the materialized body text when a response was available,
//! and the wall-clock duration of the whole execution. Processing never
//! fails as a `Result`; this report is the only way outcomes, including
//! failures, reach the caller.

use crate::{AttemptRecord, RetryError};
use std::time::Duration;

/// The aggregate result of processing one logical request.
///
/// The effective outcome is reduced from the attempt trail: the **last
/// record with a response** wins; if no attempt produced a response, the
/// **last record overall** does. A global-deadline expiry is the
/// distinguished terminal kind and surfaces from [`error`](Self::error)
/// regardless of what the records hold.
pub struct RetryReport<Req, Resp> {
    records: Vec<AttemptRecord<Req, Resp>>,
    raw_response: Option<String>,
    terminal_error: Option<RetryError>,
    duration: Duration,
}

impl<Req, Resp> RetryReport<Req, Resp> {
    pub(crate) fn new(
        records: Vec<AttemptRecord<Req, Resp>>,
        raw_response: Option<String>,
        terminal_error: Option<RetryError>,
        duration: Duration,
    ) -> Self {
        debug_assert!(!records.is_empty(), "a report always carries at least one record");
        Self { records, raw_response, terminal_error, duration }
    }

    /// The original inbound request. The first record always carries it:
    /// attempt 0 sends the original instance, and the deadline-terminal
    /// record carries it when no attempt settled.
    pub fn request(&self) -> &Req {
        self.first_record().request()
    }

    /// Chronological attempt trail. Never empty once processing completes.
    pub fn records(&self) -> &[AttemptRecord<Req, Resp>] {
        &self.records
    }

    /// The record the effective outcome is reduced from.
    pub fn effective_record(&self) -> &AttemptRecord<Req, Resp> {
        self.records
            .iter()
            .rev()
            .find(|r| r.succeeded())
            .unwrap_or_else(|| self.last_record())
    }

    /// The effective response, if any attempt produced one.
    pub fn response(&self) -> Option<&Resp> {
        self.effective_record().response()
    }

    /// The effective response's body, materialized as text. Absent when no
    /// response was produced or the best-effort body read failed.
    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    /// The effective failure: the deadline error if the global deadline
    /// fired, a body-read failure, or the effective record's own error.
    pub fn error(&self) -> Option<&RetryError> {
        self.terminal_error.as_ref().or_else(|| self.effective_record().error())
    }

    /// Whether the global deadline terminated this execution.
    pub fn deadline_exceeded(&self) -> bool {
        self.error().is_some_and(RetryError::is_deadline_exceeded)
    }

    /// Number of retries performed: one less than the number of records,
    /// zero for a single attempt.
    pub fn retry_count(&self) -> usize {
        self.records.len().saturating_sub(1)
    }

    /// Whether any retry was performed.
    pub fn has_retry(&self) -> bool {
        self.retry_count() > 0
    }

    /// Wall-clock time since the original request was issued.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Consume the report, yielding the attempt trail.
    pub fn into_records(self) -> Vec<AttemptRecord<Req, Resp>> {
        self.records
    }

    fn first_record(&self) -> &AttemptRecord<Req, Resp> {
        self.records.first().expect("a report always carries at least one record")
    }

    fn last_record(&self) -> &AttemptRecord<Req, Resp> {
        self.records.last().expect("a report always carries at least one record")
    }
}

impl<Req: std::fmt::Debug, Resp: std::fmt::Debug> std::fmt::Debug for RetryReport<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryReport")
            .field("records", &self.records)
            .field("raw_response", &self.raw_response)
            .field("terminal_error", &self.terminal_error)
            .field("duration", &self.duration)
            .finish()
    }
}

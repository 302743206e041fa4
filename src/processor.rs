//! Retry execution engine.
//!
//! [`RetryProcessor::process`] wraps one logical request: it drives the
//! attempt loop against the transport seam, applies the retry decision after
//! every settled attempt, races each suspension point (the send and the
//! backoff wait) against the global deadline, and accumulates the audit
//! trail. It never fails as a `Result`; every outcome, including the
//! deadline expiring, lands in the returned [`RetryReport`].
//!
//! Semantics:
//! - Attempts run strictly one at a time; retry `i` waits
//!   [`RetryOption::wait_for`]`(i)` first, bounded by the remaining deadline.
//! - A deadline win is permanent: the loop stops, the in-flight attempt (if
//!   any) is abandoned without a record, and the report's error is
//!   [`RetryError::DeadlineExceeded`]. If no attempt settled before the
//!   deadline fired, a single terminal record carrying the original request
//!   is appended so the trail is never empty.
//! - Every retry sends a fresh [`Request::clone_request`] copy; a prior
//!   attempt may have consumed request state such as a body stream.
//!
//! Invariants:
//! - With `retry_count = N`, between 1 and N+1 records are produced.
//! - The loop is iterative; retry depth never grows the stack.
//! - Records are owned by the executing call and never shared, so concurrent
//!   `process` calls are fully independent.

use crate::{
    AttemptRecord, Request, Response, RetryError, RetryOption, RetryReport, Sleeper,
    TokioSleeper, Transport,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Per-call input: the outbound request and the (possibly absent) policy.
///
/// An absent policy degenerates to a single attempt with no retry
/// evaluation.
#[derive(Debug)]
pub struct ProcessContext<Req> {
    pub request: Req,
    pub option: Option<RetryOption>,
}

impl<Req> ProcessContext<Req> {
    /// Context with no retry policy: a single attempt.
    pub fn new(request: Req) -> Self {
        Self { request, option: None }
    }

    /// Attach a retry policy.
    pub fn with_option(mut self, option: RetryOption) -> Self {
        self.option = Some(option);
        self
    }
}

/// Outcome of racing a suspension point against the global deadline.
enum Raced<T> {
    Done(T),
    Deadline,
}

/// The retry execution engine.
///
/// Stateless apart from its sleeper, so one processor may serve any number
/// of concurrent calls.
#[derive(Debug, Clone)]
pub struct RetryProcessor {
    sleeper: Arc<dyn Sleeper>,
}

impl RetryProcessor {
    /// Processor with the production tokio sleeper.
    pub fn new() -> Self {
        Self { sleeper: Arc::new(TokioSleeper) }
    }

    /// Processor with an injected sleeper (tests use `InstantSleeper` or
    /// `TrackingSleeper`).
    pub fn with_sleeper<S>(sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        Self { sleeper: Arc::new(sleeper) }
    }

    /// Execute one logical request under the context's retry policy.
    ///
    /// All failures are captured into the report; this method has no error
    /// path of its own.
    pub async fn process<Req, Resp, T>(
        &self,
        context: ProcessContext<Req>,
        transport: &mut T,
    ) -> RetryReport<Req, Resp>
    where
        Req: Request,
        Resp: Response,
        T: Transport<Req, Resp> + ?Sized,
    {
        let start = Instant::now();
        let ProcessContext { request, option } = context;
        let budget = option.as_ref().and_then(RetryOption::total_timeout);
        let deadline = budget.and_then(|b| start.checked_add(b));

        let mut records: Vec<AttemptRecord<Req, Resp>> = Vec::new();
        let mut req = request;
        let mut attempt: usize = 0;

        let deadline_hit = loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                if records.is_empty() {
                    records.push(deadline_record(req, start, budget));
                }
                break true;
            }

            let attempt_start = Instant::now();
            let sent = race_deadline(deadline, transport.send(&mut req)).await;
            let elapsed = attempt_start.elapsed();
            match sent {
                Raced::Deadline => {
                    // The in-flight attempt is abandoned; it settled neither
                    // with a response nor with a transport error.
                    if records.is_empty() {
                        records.push(deadline_record(req, start, budget));
                    }
                    break true;
                }
                Raced::Done(Ok(response)) => {
                    records.push(AttemptRecord::success(req, response, elapsed));
                }
                Raced::Done(Err(error)) => {
                    records.push(AttemptRecord::failure(req, error.into(), elapsed));
                }
            }

            let record = records.last().expect("an attempt record was just appended");
            if !can_retry(option.as_ref(), record, attempt) {
                break false;
            }

            req = record.request().clone_request();
            let wait = option.as_ref().map(|o| o.wait_for(attempt)).unwrap_or(Duration::ZERO);
            if self.wait_backoff(wait, deadline).await {
                break true;
            }
            attempt += 1;
        };

        let total = start.elapsed();
        let mut terminal_error = deadline_hit.then(|| RetryError::DeadlineExceeded {
            elapsed: total,
            budget: budget.unwrap_or_default(),
        });

        let raw_response = match effective_response_mut(&mut records) {
            Some(response) => match response.text().await {
                Ok(text) => Some(text),
                Err(error) => {
                    // Best-effort: keep the response, surface the failure,
                    // but never displace a deadline error.
                    if terminal_error.is_none() {
                        terminal_error = Some(RetryError::Body(error));
                    } else {
                        tracing::debug!(error = %error, "body read failed after deadline expiry");
                    }
                    None
                }
            },
            None => None,
        };

        let report = RetryReport::new(records, raw_response, terminal_error, total);
        tracing::info!(
            uri = %report.request().uri(),
            duration_ms = total.as_millis() as u64,
            retries = report.retry_count(),
            "request processed"
        );
        report
    }

    /// Suspend for a backoff interval, bounded by the deadline. Returns true
    /// when the deadline fired during the wait.
    async fn wait_backoff(&self, wait: Duration, deadline: Option<Instant>) -> bool {
        if wait.is_zero() {
            return false;
        }
        matches!(race_deadline(deadline, self.sleeper.sleep(wait)).await, Raced::Deadline)
    }
}

impl Default for RetryProcessor {
    fn default() -> Self {
        Self::new()
    }
}

async fn race_deadline<F>(deadline: Option<Instant>, fut: F) -> Raced<F::Output>
where
    F: Future,
{
    match deadline {
        None => Raced::Done(fut.await),
        Some(deadline) => {
            tokio::select! {
                biased;
                _ = tokio::time::sleep_until(deadline) => Raced::Deadline,
                output = fut => Raced::Done(output),
            }
        }
    }
}

fn deadline_record<Req, Resp>(
    request: Req,
    start: Instant,
    budget: Option<Duration>,
) -> AttemptRecord<Req, Resp> {
    AttemptRecord::failure(
        request,
        RetryError::DeadlineExceeded {
            elapsed: start.elapsed(),
            budget: budget.unwrap_or_default(),
        },
        start.elapsed(),
    )
}

fn effective_response_mut<Req, Resp>(
    records: &mut [AttemptRecord<Req, Resp>],
) -> Option<&mut Resp> {
    records.iter_mut().rev().find_map(AttemptRecord::response_mut)
}

/// The retry decision, evaluated against the record of the attempt that just
/// settled. Checks run in a fixed order: policy presence, retry budget, then
/// mode-specific eligibility.
fn can_retry<Req, Resp>(
    option: Option<&RetryOption>,
    record: &AttemptRecord<Req, Resp>,
    attempt: usize,
) -> bool
where
    Req: Request,
    Resp: Response,
{
    let Some(option) = option else {
        return false;
    };
    if attempt >= option.retry_count() as usize {
        return false;
    }
    if option.transient_error_retry() {
        // Transient mode retries transport failures only; a completed
        // response is never retried here, whatever its status.
        return match record.error() {
            Some(RetryError::Transport(e)) => e.is_transient(),
            _ => false,
        };
    }
    // Status/method mode: only completed responses are eligible, and both
    // the status code and the request method must match.
    let Some(response) = record.response() else {
        return false;
    };
    option.retry_count() > 0
        && option.retries_status(response.status())
        && option.retries_method(record.request().method())
}

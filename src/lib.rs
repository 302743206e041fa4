#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Encore
//!
//! Deadline-bounded retry execution for async request pipelines, with a full
//! attempt-by-attempt audit trail.
//!
//! Encore wraps one logical network request with a bounded-retry policy and
//! a global execution deadline, then reports everything that happened: every
//! attempt's request, response or failure, and duration, plus the effective
//! outcome reduced from the trail. Processing never fails as a `Result`:
//! whatever goes wrong lands in the returned [`RetryReport`].
//!
//! ## Features
//!
//! - **Two retry modes**: transient transport failures, or status-code +
//!   method matching for responses
//! - **Global deadline** racing every suspension point (send and backoff),
//!   surfaced as a distinguished terminal error
//! - **Ordered backoff intervals** per retry, clamping to the last entry
//! - **Audit trail**: immutable per-attempt records, never shared across
//!   calls
//! - **Tower integration** via [`ProcessLayer`]
//! - **Deterministic tests** via injectable sleepers
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use encore::{
//!     ProcessContext, Request, Response, RetryOption, RetryProcessor, Transport,
//!     TransportError,
//! };
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Ping {
//!     uri: String,
//! }
//!
//! impl Request for Ping {
//!     fn clone_request(&self) -> Self {
//!         Ping { uri: self.uri.clone() }
//!     }
//!     fn method(&self) -> &str {
//!         "GET"
//!     }
//!     fn uri(&self) -> &str {
//!         &self.uri
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Pong {
//!     status: u16,
//! }
//!
//! #[async_trait]
//! impl Response for Pong {
//!     fn status(&self) -> u16 {
//!         self.status
//!     }
//!     async fn text(&mut self) -> Result<String, TransportError> {
//!         Ok("pong".into())
//!     }
//! }
//!
//! struct FlakyPing {
//!     failures_left: usize,
//! }
//!
//! #[async_trait]
//! impl Transport<Ping, Pong> for FlakyPing {
//!     async fn send(&mut self, _request: &mut Ping) -> Result<Pong, TransportError> {
//!         if self.failures_left > 0 {
//!             self.failures_left -= 1;
//!             return Err(TransportError::Connect("connection refused".into()));
//!         }
//!         Ok(Pong { status: 200 })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let option = RetryOption::builder()
//!         .retry_count(2)
//!         .wait_intervals([Duration::from_millis(1)])
//!         .transient_error_retry(true)
//!         .build()
//!         .unwrap();
//!
//!     let context = ProcessContext::new(Ping { uri: "http://example.test/ping".into() })
//!         .with_option(option);
//!     let mut transport = FlakyPing { failures_left: 1 };
//!
//!     let report = RetryProcessor::new().process(context, &mut transport).await;
//!
//!     assert_eq!(report.retry_count(), 1);
//!     assert_eq!(report.response().unwrap().status(), 200);
//!     assert_eq!(report.raw_response(), Some("pong"));
//! }
//! ```

pub mod error;
pub mod layer;
pub mod option;
pub mod presets;
pub mod processor;
pub mod record;
pub mod report;
pub mod transport;
pub mod waiter;

// Re-exports
pub use error::{RetryError, TransportError};
pub use layer::{ProcessLayer, ProcessService};
pub use option::{BuildError, RetryOption, RetryOptionBuilder};
pub use processor::{ProcessContext, RetryProcessor};
pub use record::AttemptRecord;
pub use report::RetryReport;
pub use transport::{Request, Response, Transport};
pub use waiter::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};

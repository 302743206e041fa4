#![allow(dead_code)] // shared across test binaries; not every binary uses every helper

use async_trait::async_trait;
use encore::{Request, Response, Transport, TransportError};
use std::collections::VecDeque;
use std::time::Duration;

/// Request double. `generation` is 0 for the original and bumps on every
/// `clone_request`, so tests can verify which instance an attempt sent.
#[derive(Debug)]
pub struct FakeRequest {
    pub method: &'static str,
    pub uri: &'static str,
    pub consumed: bool,
    pub generation: usize,
}

impl FakeRequest {
    pub fn get(uri: &'static str) -> Self {
        Self::with_method("GET", uri)
    }

    pub fn with_method(method: &'static str, uri: &'static str) -> Self {
        Self { method, uri, consumed: false, generation: 0 }
    }
}

impl Request for FakeRequest {
    fn clone_request(&self) -> Self {
        Self { method: self.method, uri: self.uri, consumed: false, generation: self.generation + 1 }
    }

    fn method(&self) -> &str {
        self.method
    }

    fn uri(&self) -> &str {
        self.uri
    }
}

/// Response double with an optionally broken body stream.
#[derive(Debug)]
pub struct FakeResponse {
    pub status: u16,
    pub body: String,
    pub fail_body: bool,
}

impl FakeResponse {
    pub fn ok(status: u16, body: &str) -> Self {
        Self { status, body: body.to_string(), fail_body: false }
    }

    pub fn broken_body(status: u16) -> Self {
        Self { status, body: String::new(), fail_body: true }
    }
}

#[async_trait]
impl Response for FakeResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn text(&mut self) -> Result<String, TransportError> {
        if self.fail_body {
            return Err(TransportError::Connect("body stream reset".into()));
        }
        Ok(self.body.clone())
    }
}

pub struct ScriptedStep {
    pub delay: Duration,
    pub outcome: Result<FakeResponse, TransportError>,
}

/// Transport double that plays back a fixed script, one step per attempt,
/// optionally sleeping first (paused-clock tests use the delays).
pub struct ScriptedTransport {
    steps: VecDeque<ScriptedStep>,
    pub calls: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self { steps: VecDeque::new(), calls: 0 }
    }

    pub fn then_status(self, status: u16) -> Self {
        self.then_response(FakeResponse::ok(status, &format!("status {status}")))
    }

    pub fn then_response(mut self, response: FakeResponse) -> Self {
        self.steps.push_back(ScriptedStep { delay: Duration::ZERO, outcome: Ok(response) });
        self
    }

    pub fn then_error(mut self, error: TransportError) -> Self {
        self.steps.push_back(ScriptedStep { delay: Duration::ZERO, outcome: Err(error) });
        self
    }

    pub fn then_delayed_status(mut self, delay: Duration, status: u16) -> Self {
        self.steps.push_back(ScriptedStep {
            delay,
            outcome: Ok(FakeResponse::ok(status, &format!("status {status}"))),
        });
        self
    }

    pub fn then_delayed_error(mut self, delay: Duration, error: TransportError) -> Self {
        self.steps.push_back(ScriptedStep { delay, outcome: Err(error) });
        self
    }
}

#[async_trait]
impl Transport<FakeRequest, FakeResponse> for ScriptedTransport {
    async fn send(&mut self, request: &mut FakeRequest) -> Result<FakeResponse, TransportError> {
        request.consumed = true;
        self.calls += 1;
        let step = self.steps.pop_front().expect("transport script exhausted");
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.outcome
    }
}

//! Trait seams to the transport collaborator.
//!
//! The engine never owns a wire format. It asks three things of the caller:
//! a request that can be duplicated for a retry and interrogated for its
//! method and target, a response that exposes a status code and can
//! materialize its body as text, and an async send operation connecting the
//! two. Everything else (serialization, pooling, TLS) stays on the caller's
//! side of these traits.

use crate::TransportError;
use async_trait::async_trait;

/// An outbound request the engine can audit and re-send.
pub trait Request: Send {
    /// Produce an independent, unconsumed copy of this request.
    ///
    /// This is a hard requirement for retries, not an optimization: a sent
    /// request may carry attempt-specific mutable state such as a body
    /// cursor, so every retry must start from a fully separate instance that
    /// is logically equal to the original. Implementations must not share
    /// mutable state between the copy and `self`.
    fn clone_request(&self) -> Self;

    /// The request method, e.g. `"GET"`. Matched case-insensitively against
    /// a policy's retryable methods.
    fn method(&self) -> &str;

    /// The target URI, used for the per-call summary log line.
    fn uri(&self) -> &str;
}

/// An inbound response the engine can classify and materialize.
#[async_trait]
pub trait Response: Send {
    /// Numeric status code, e.g. `503`.
    fn status(&self) -> u16;

    /// Materialize the body as text. May consume the underlying stream.
    async fn text(&mut self) -> Result<String, TransportError>;
}

/// The send operation supplied by the transport layer.
///
/// The request is borrowed mutably because sending may consume request state;
/// the engine keeps ownership so the instance can be recorded afterwards.
/// A returned `Err` is an attempt failure, not a fatal error: the engine
/// records it and evaluates it for retry.
#[async_trait]
pub trait Transport<Req, Resp>: Send {
    async fn send(&mut self, request: &mut Req) -> Result<Resp, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoRequest {
        method: String,
        uri: String,
        consumed: bool,
    }

    impl Request for EchoRequest {
        fn clone_request(&self) -> Self {
            Self { method: self.method.clone(), uri: self.uri.clone(), consumed: false }
        }

        fn method(&self) -> &str {
            &self.method
        }

        fn uri(&self) -> &str {
            &self.uri
        }
    }

    struct EchoResponse {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl Response for EchoResponse {
        fn status(&self) -> u16 {
            self.status
        }

        async fn text(&mut self) -> Result<String, TransportError> {
            Ok(std::mem::take(&mut self.body))
        }
    }

    struct EchoTransport;

    #[async_trait]
    impl Transport<EchoRequest, EchoResponse> for EchoTransport {
        async fn send(&mut self, request: &mut EchoRequest) -> Result<EchoResponse, TransportError> {
            request.consumed = true;
            Ok(EchoResponse { status: 200, body: request.uri.clone() })
        }
    }

    #[tokio::test]
    async fn clone_request_is_unconsumed() {
        let mut transport = EchoTransport;
        let mut original = EchoRequest {
            method: "GET".into(),
            uri: "http://example.test/".into(),
            consumed: false,
        };
        let _ = transport.send(&mut original).await.unwrap();
        assert!(original.consumed);

        let copy = original.clone_request();
        assert!(!copy.consumed);
        assert_eq!(copy.method(), "GET");
        assert_eq!(copy.uri(), original.uri());
    }

    #[tokio::test]
    async fn text_materializes_body() {
        let mut transport = EchoTransport;
        let mut req = EchoRequest {
            method: "GET".into(),
            uri: "http://example.test/body".into(),
            consumed: false,
        };
        let mut resp = transport.send(&mut req).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "http://example.test/body");
    }
}

//! Tower-native processing layer.
//!
//! [`ProcessLayer`] wraps any `tower_service::Service` whose request type
//! implements [`Request`], whose response implements [`Response`], and whose
//! error converts into [`TransportError`]. The wrapped service responds with
//! the full [`RetryReport`]; `call` itself never fails, so the service error
//! type only surfaces `poll_ready` passthrough from the inner service.
//!
//! Tower services consume their request, so the transport adapter hands the
//! inner service an independent copy of each attempt's request; the
//! processor keeps the instance it audits.

use crate::{
    ProcessContext, Request, Response, RetryOption, RetryProcessor, RetryReport, Transport,
    TransportError,
};
use async_trait::async_trait;
use futures::future::BoxFuture;
use tower_layer::Layer;
use tower_service::Service;

/// Tower layer applying a [`RetryProcessor`] around an inner service.
#[derive(Debug, Clone)]
pub struct ProcessLayer {
    processor: RetryProcessor,
    option: Option<RetryOption>,
}

impl ProcessLayer {
    /// Layer executing every call under `option`.
    pub fn new(option: RetryOption) -> Self {
        Self { processor: RetryProcessor::new(), option: Some(option) }
    }

    /// Layer with retries disabled: every call is a single attempt.
    pub fn single_attempt() -> Self {
        Self { processor: RetryProcessor::new(), option: None }
    }

    /// Layer with an explicit processor (e.g. one with an injected sleeper).
    pub fn with_processor(processor: RetryProcessor, option: Option<RetryOption>) -> Self {
        Self { processor, option }
    }
}

impl<S> Layer<S> for ProcessLayer {
    type Service = ProcessService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ProcessService {
            inner,
            processor: self.processor.clone(),
            option: self.option.clone(),
        }
    }
}

/// Service produced by [`ProcessLayer`].
#[derive(Debug, Clone)]
pub struct ProcessService<S> {
    inner: S,
    processor: RetryProcessor,
    option: Option<RetryOption>,
}

/// Adapter driving a cloned inner service as the processor's transport.
struct ServiceTransport<S> {
    inner: S,
}

#[async_trait]
impl<S, Req> Transport<Req, S::Response> for ServiceTransport<S>
where
    Req: Request,
    S: Service<Req> + Send + 'static,
    S::Response: Send + 'static,
    S::Error: Into<TransportError>,
    S::Future: Send + 'static,
{
    async fn send(&mut self, request: &mut Req) -> Result<S::Response, TransportError> {
        std::future::poll_fn(|cx| self.inner.poll_ready(cx)).await.map_err(Into::into)?;
        self.inner.call(request.clone_request()).await.map_err(Into::into)
    }
}

impl<S, Req> Service<Req> for ProcessService<S>
where
    Req: Request + 'static,
    S: Service<Req> + Clone + Send + 'static,
    S::Response: Response + 'static,
    S::Error: Into<TransportError> + 'static,
    S::Future: Send + 'static,
{
    type Response = RetryReport<Req, S::Response>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Req) -> Self::Future {
        let processor = self.processor.clone();
        let option = self.option.clone();
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut context = ProcessContext::new(request);
            if let Some(option) = option {
                context = context.with_option(option);
            }
            let mut transport = ServiceTransport { inner };
            Ok(processor.process(context, &mut transport).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstantSleeper;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::{ServiceBuilder, ServiceExt};

    #[derive(Debug)]
    struct TestRequest;

    impl Request for TestRequest {
        fn clone_request(&self) -> Self {
            TestRequest
        }

        fn method(&self) -> &str {
            "GET"
        }

        fn uri(&self) -> &str {
            "http://layer.test/"
        }
    }

    #[derive(Debug)]
    struct TestResponse {
        status: u16,
    }

    #[async_trait]
    impl Response for TestResponse {
        fn status(&self) -> u16 {
            self.status
        }

        async fn text(&mut self) -> Result<String, TransportError> {
            Ok(format!("status {}", self.status))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("test service error")]
    struct TestError;

    impl From<TestError> for TransportError {
        fn from(err: TestError) -> Self {
            TransportError::other(err)
        }
    }

    /// Returns 503 until `healthy_after` calls have been made, then 200.
    #[derive(Clone)]
    struct FlakyService {
        healthy_after: usize,
        calls: Arc<AtomicUsize>,
    }

    impl Service<TestRequest> for FlakyService {
        type Response = TestResponse;
        type Error = TestError;
        type Future = futures::future::Ready<Result<TestResponse, TestError>>;

        fn poll_ready(
            &mut self,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Result<(), Self::Error>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn call(&mut self, _req: TestRequest) -> Self::Future {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let status = if n >= self.healthy_after { 200 } else { 503 };
            futures::future::ready(Ok(TestResponse { status }))
        }
    }

    fn option() -> RetryOption {
        RetryOption::builder()
            .retry_count(3)
            .retry_status_codes([503])
            .retry_methods(["GET"])
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn layer_retries_until_inner_service_recovers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let layer = ProcessLayer::with_processor(
            RetryProcessor::with_sleeper(InstantSleeper),
            Some(option()),
        );
        let mut service = ServiceBuilder::new()
            .layer(layer)
            .service(FlakyService { healthy_after: 3, calls: calls.clone() });

        let report = service.ready().await.unwrap().call(TestRequest).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.records().len(), 3);
        assert_eq!(report.retry_count(), 2);
        assert_eq!(report.response().unwrap().status, 200);
        assert_eq!(report.raw_response(), Some("status 200"));
    }

    #[tokio::test]
    async fn single_attempt_layer_never_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut service = ServiceBuilder::new()
            .layer(ProcessLayer::single_attempt())
            .service(FlakyService { healthy_after: 3, calls: calls.clone() });

        let report = service.ready().await.unwrap().call(TestRequest).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.records().len(), 1);
        assert_eq!(report.retry_count(), 0);
        assert_eq!(report.response().unwrap().status, 503);
    }

    #[tokio::test]
    async fn inner_service_errors_are_recorded_not_raised() {
        #[derive(Clone)]
        struct AlwaysErr;

        impl Service<TestRequest> for AlwaysErr {
            type Response = TestResponse;
            type Error = TestError;
            type Future = futures::future::Ready<Result<TestResponse, TestError>>;

            fn poll_ready(
                &mut self,
                _cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<Result<(), Self::Error>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn call(&mut self, _req: TestRequest) -> Self::Future {
                futures::future::ready(Err(TestError))
            }
        }

        let mut service =
            ServiceBuilder::new().layer(ProcessLayer::new(option())).service(AlwaysErr);

        let report = service.ready().await.unwrap().call(TestRequest).await.unwrap();

        // An inner error is an attempt failure, and status/method mode never
        // retries exceptional attempts.
        assert_eq!(report.records().len(), 1);
        assert!(report.error().unwrap().is_transport());
        assert!(report.response().is_none());
    }
}

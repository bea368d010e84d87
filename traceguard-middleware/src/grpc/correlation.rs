//! Correlation-ID assignment for gRPC calls

use std::task::{Context, Poll};

use tower::{Layer, Service};

use traceguard_logging::CorrelationId;

/// Layer producing [`CorrelationService`].
///
/// Must be the outermost layer of the pipeline so the identifier exists
/// before the logging layer opens the call's entry.
#[derive(Debug, Clone, Default)]
pub struct CorrelationLayer;

impl CorrelationLayer {
    /// Create the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService { inner }
    }
}

/// Tags every call with a fresh [`CorrelationId`] in its extensions.
#[derive(Debug, Clone)]
pub struct CorrelationService<S> {
    inner: S,
}

impl<S, B> Service<::http::Request<B>> for CorrelationService<S>
where
    S: Service<::http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: ::http::Request<B>) -> Self::Future {
        request.extensions_mut().insert(CorrelationId::generate());
        self.inner.call(request)
    }
}

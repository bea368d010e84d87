//! Panic recovery for gRPC calls

use std::panic::AssertUnwindSafe;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use http_body_util::BodyExt;
use serde_json::json;
use tonic::body::BoxBody;
use tonic::Status;
use tower::{Layer, Service};

use traceguard_logging::active_log;

use crate::fault;

/// Layer producing [`RecoverService`].
///
/// Must be the innermost layer so a panic anywhere in the handler chain is
/// converted before it can unwind past the logging layer.
#[derive(Debug, Clone, Default)]
pub struct RecoverLayer;

impl RecoverLayer {
    /// Create the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RecoverLayer {
    type Service = RecoverService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RecoverService { inner }
    }
}

/// Converts an unwinding handler into an `Internal` status.
///
/// The stack trace goes to the active log entry; the wire sees a
/// trailers-only response whose message is `panic caught: <value>`.
#[derive(Debug, Clone)]
pub struct RecoverService<S> {
    inner: S,
}

impl<S, ReqB> Service<::http::Request<ReqB>> for RecoverService<S>
where
    S: Service<::http::Request<ReqB>, Response = ::http::Response<BoxBody>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    ReqB: Send + 'static,
{
    type Response = ::http::Response<BoxBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: ::http::Request<ReqB>) -> Self::Future {
        let log = active_log(request.extensions());

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let guarded = AssertUnwindSafe(async move { inner.call(request).await });
            match guarded.catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message =
                        format!("panic caught: {}", fault::panic_message(payload.as_ref()));
                    if let Some(log) = log {
                        log.record_error(&message);
                        log.attach("panic", [("stack", json!(fault::captured_backtrace()))]);
                    }
                    Ok(status_response(Status::internal(message)))
                }
            }
        })
    }
}

/// Build a trailers-only response carrying the status in its headers.
fn status_response(status: Status) -> ::http::Response<BoxBody> {
    let mut response = ::http::Response::new(empty_body());
    response.headers_mut().insert(
        ::http::header::CONTENT_TYPE,
        ::http::HeaderValue::from_static("application/grpc"),
    );
    if status.add_header(response.headers_mut()).is_err() {
        // The panic payload produced metadata tonic refuses to encode;
        // degrade to the bare code.
        let _ = Status::internal("panic caught").add_header(response.headers_mut());
    }
    response
}

fn empty_body() -> BoxBody {
    http_body_util::Empty::<bytes::Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

//! Structured request logging for gRPC calls

use std::collections::HashSet;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::future::BoxFuture;
use serde_json::json;
use tonic::{Code, Status};
use tower::{Layer, Service};

use traceguard_logging::{correlation_id, ActiveLog, LogEntry, Redaction, Severity};

use crate::headers::header_pairs;

/// Metadata keys that are always redacted, regardless of configuration.
pub const SENSITIVE_METADATA: &[&str] = &["authorization"];

/// Configuration for [`LoggerLayer`].
#[derive(Debug, Clone)]
pub struct GrpcLoggerConfig {
    /// Concise records omit the incoming/outgoing metadata groups
    /// (default: `false`).
    pub concise: bool,
    /// Additional metadata keys to redact, case-insensitive. The
    /// [`SENSITIVE_METADATA`] keys are enforced on top of this set.
    pub sensitive: HashSet<String>,
    /// Disable redaction entirely. Development only (default: `false`).
    pub leak: bool,
}

impl Default for GrpcLoggerConfig {
    fn default() -> Self {
        Self {
            concise: false,
            sensitive: HashSet::new(),
            leak: false,
        }
    }
}

impl GrpcLoggerConfig {
    fn redaction(&self) -> Redaction {
        Redaction::new(
            self.sensitive.iter().cloned(),
            SENSITIVE_METADATA,
            self.leak,
        )
    }
}

/// Layer producing [`LoggerService`].
///
/// Sits between the correlation and recovery layers: the entry it opens
/// must exist before recovery runs, and its timing brackets the recovery
/// scope.
#[derive(Debug, Clone)]
pub struct LoggerLayer {
    config: GrpcLoggerConfig,
}

impl LoggerLayer {
    /// Create the layer.
    pub fn new(config: GrpcLoggerConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for LoggerLayer {
    type Service = LoggerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggerService {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Wraps a call in a [`LogEntry`] and emits one record when it completes.
///
/// The terminal code is read back from the response's `grpc-status`
/// metadata; a response without one completed with `Ok` (the status then
/// travels in the trailers).
#[derive(Debug, Clone)]
pub struct LoggerService<S> {
    inner: S,
    config: GrpcLoggerConfig,
}

impl<S, ReqB, ResB> Service<::http::Request<ReqB>> for LoggerService<S>
where
    S: Service<::http::Request<ReqB>, Response = ::http::Response<ResB>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqB: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: ::http::Request<ReqB>) -> Self::Future {
        let log = ActiveLog::new(LogEntry::new(self.config.redaction(), self.config.concise));
        request.extensions_mut().insert(log.clone());
        if let Some(id) = correlation_id(request.extensions()) {
            log.set_correlation_id(&id);
        }

        let method = request.uri().path().to_string();
        let incoming = (!self.config.concise).then(|| header_pairs(request.headers()));
        let concise = self.config.concise;

        // Take the readiness-polled service into the future; a fresh clone
        // stays behind for the next call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let started = Instant::now();
            let result = inner.call(request).await;
            let elapsed = started.elapsed();

            log.attach("rpc", [("method", json!(method))]);
            if let Some(pairs) = incoming {
                log.attach_redacted("incoming", pairs);
            }

            match &result {
                Ok(response) => {
                    let status = Status::from_header_map(response.headers());
                    let code = status.as_ref().map(Status::code).unwrap_or(Code::Ok);
                    if log.recorded_error().is_none() {
                        if let Some(status) = &status {
                            if !status.message().is_empty() {
                                log.record_error(status.message());
                            }
                        }
                    }
                    log.attach(
                        "rpc",
                        [(
                            "status",
                            json!({ "code": code as i32, "msg": format!("{code:?}") }),
                        )],
                    );
                    if !concise {
                        log.attach_redacted("outgoing", header_pairs(response.headers()));
                    }
                    let line = format!("{} {:?}", code as i32, code);
                    log.finish(severity_for_code(code), &line, elapsed);
                }
                Err(_) => {
                    log.record_error("transport error");
                    let code = Code::Unknown;
                    let line = format!("{} {:?}", code as i32, code);
                    log.finish(Severity::Error, &line, elapsed);
                }
            }

            result
        })
    }
}

/// Derive log severity from a canonical gRPC status code.
pub fn severity_for_code(code: Code) -> Severity {
    match code {
        Code::Ok => Severity::Info,
        Code::NotFound
        | Code::Cancelled
        | Code::AlreadyExists
        | Code::InvalidArgument
        | Code::Unauthenticated
        | Code::PermissionDenied
        | Code::ResourceExhausted
        | Code::FailedPrecondition
        | Code::Aborted
        | Code::OutOfRange => Severity::Warn,
        Code::DeadlineExceeded
        | Code::Internal
        | Code::Unavailable
        | Code::Unknown
        | Code::Unimplemented
        | Code::DataLoss => Severity::Error,
    }
}

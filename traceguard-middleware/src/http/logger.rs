//! Structured request logging for HTTP calls

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::HOST;
use axum::middleware::Next;
use axum::response::Response;
use http_body::Body as _;
use serde_json::json;

use traceguard_logging::{correlation_id, ActiveLog, LogEntry, Redaction, Severity};

use crate::headers::header_pairs;

/// Header keys that are always redacted, regardless of configuration.
pub const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Configuration for [`log_requests`].
#[derive(Debug, Clone)]
pub struct HttpLoggerConfig {
    /// Concise records omit host/path/proto/remote detail and all header
    /// groups (default: `false`).
    pub concise: bool,
    /// Additional header keys to redact, case-insensitive. The
    /// [`SENSITIVE_HEADERS`] are enforced on top of this set.
    pub sensitive: HashSet<String>,
    /// Disable redaction entirely. Development only (default: `false`).
    pub leak: bool,
}

impl Default for HttpLoggerConfig {
    fn default() -> Self {
        Self {
            concise: false,
            sensitive: HashSet::new(),
            leak: false,
        }
    }
}

impl HttpLoggerConfig {
    fn redaction(&self) -> Redaction {
        Redaction::new(self.sensitive.iter().cloned(), SENSITIVE_HEADERS, self.leak)
    }
}

/// Wrap a call in a [`LogEntry`] and emit one record when it completes.
///
/// Runs after [`super::assign_correlation_id`] and before
/// [`super::catch_panics`]: recovery needs a live entry to record stack
/// traces into, and the measured duration must bracket the recovery scope.
pub async fn log_requests(
    State(config): State<HttpLoggerConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let log = ActiveLog::new(LogEntry::new(config.redaction(), config.concise));
    request.extensions_mut().insert(log.clone());
    if let Some(id) = correlation_id(request.extensions()) {
        log.set_correlation_id(&id);
    }

    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let detail = (!config.concise).then(|| {
        let host = request
            .headers()
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let remote = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string());
        (
            host,
            request.uri().path().to_string(),
            format!("{:?}", request.version()),
            remote,
            header_pairs(request.headers()),
        )
    });

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();

    log.attach("request", [("method", json!(method)), ("uri", json!(uri))]);
    if let Some((host, path, proto, remote, request_headers)) = detail {
        log.attach(
            "request",
            [
                ("host", json!(host)),
                ("path", json!(path)),
                ("proto", json!(proto)),
                ("remote", json!(remote)),
            ],
        );
        log.attach_nested_redacted("request", "headers", request_headers);
    }

    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("");
    log.attach(
        "response",
        [
            ("size", json!(response.body().size_hint().exact())),
            (
                "status",
                json!({ "code": status.as_u16(), "msg": reason }),
            ),
        ],
    );
    if !config.concise {
        log.attach_nested_redacted("response", "headers", header_pairs(response.headers()));
    }

    let line = format!("{} {}", status.as_u16(), reason);
    log.finish(severity_for_status(status.as_u16()), &line, elapsed);

    response
}

/// Derive log severity from an HTTP status code.
pub fn severity_for_status(status: u16) -> Severity {
    if status >= 500 {
        Severity::Error
    } else if status >= 400 {
        Severity::Warn
    } else {
        Severity::Info
    }
}

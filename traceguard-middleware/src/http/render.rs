//! Error rendering for the HTTP wire format

use std::error::Error as StdError;

use axum::http::Extensions;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use traceguard_errors::{find_classified, ClassifiedRef, ErrorKind};
use traceguard_logging::attach_log_error;

#[derive(Debug, Serialize)]
struct SingleError<'a> {
    error: &'a str,
}

#[derive(Debug, Serialize)]
struct GroupedErrors {
    errors: Vec<String>,
}

/// Render a handler error as the classified wire response.
///
/// The raw error text always goes to the active log entry; the response
/// body carries only classified messages. A classified error with no
/// message, and any unclassified error, produce a status-only response.
pub fn render_error(extensions: &Extensions, err: &(dyn StdError + 'static)) -> Response {
    attach_log_error(extensions, &err.to_string());

    match find_classified(err) {
        Some(ClassifiedRef::Single(classified)) => {
            let status = classified.kind().http_status();
            let message = classified.message();
            if message.is_empty() {
                status.into_response()
            } else {
                (status, Json(SingleError { error: &message })).into_response()
            }
        }
        Some(ClassifiedRef::Group(group)) => (
            group.kind().http_status(),
            Json(GroupedErrors {
                errors: group.messages(),
            }),
        )
            .into_response(),
        None => ErrorKind::Unknown.http_status().into_response(),
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;

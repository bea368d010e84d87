//! Request-extension helpers
//!
//! Both transports publish the call's [`CorrelationId`] and [`ActiveLog`]
//! through `http::Extensions`. These helpers let collaborators enrich the
//! active entry without ever holding a direct reference to it; they are
//! silently inert when no entry is installed (e.g. a route mounted without
//! the logging middleware).

use http::Extensions;
use serde_json::Value;

use crate::correlation::CorrelationId;
use crate::entry::ActiveLog;

/// The call's active log handle, if the logging middleware installed one.
pub fn active_log(extensions: &Extensions) -> Option<ActiveLog> {
    extensions.get::<ActiveLog>().cloned()
}

/// The call's correlation identifier, if the correlation middleware ran.
pub fn correlation_id(extensions: &Extensions) -> Option<CorrelationId> {
    extensions.get::<CorrelationId>().cloned()
}

/// Append attributes to a group of the active entry.
pub fn attach_log_attrs<K: Into<String>>(
    extensions: &Extensions,
    group: &str,
    attrs: impl IntoIterator<Item = (K, Value)>,
) {
    if let Some(log) = extensions.get::<ActiveLog>() {
        log.attach(group, attrs);
    }
}

/// Record the rendered error text on the active entry.
pub fn attach_log_error(extensions: &Extensions, message: &str) {
    if let Some(log) = extensions.get::<ActiveLog>() {
        log.record_error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogEntry;
    use crate::redaction::Redaction;
    use serde_json::json;

    #[test]
    fn helpers_reach_the_installed_entry() {
        let mut extensions = Extensions::new();
        let log = ActiveLog::new(LogEntry::new(
            Redaction::new(Vec::<String>::new(), &[], false),
            false,
        ));
        extensions.insert(log.clone());

        attach_log_attrs(&extensions, "handler", [("id", json!("hello"))]);
        attach_log_error(&extensions, "message not found");

        assert_eq!(log.as_value()["handler"]["id"], "hello");
        assert_eq!(log.recorded_error().as_deref(), Some("message not found"));
    }

    #[test]
    fn helpers_are_inert_without_an_entry() {
        let extensions = Extensions::new();
        attach_log_attrs(&extensions, "handler", [("id", json!("hello"))]);
        attach_log_error(&extensions, "ignored");
        assert!(active_log(&extensions).is_none());
        assert!(correlation_id(&extensions).is_none());
    }
}

//! Call-scoped log accumulation
//!
//! A [`LogEntry`] collects everything worth knowing about one inbound call
//! and emits a single structured record when the call unwinds. The entry is
//! owned by the call's execution context and shared between middleware
//! stages through the cloneable [`ActiveLog`] handle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::correlation::CorrelationId;
use crate::redaction::Redaction;

/// Log severity derived from a call's terminal status.
///
/// Derived per transport from the status-code table; never stored on the
/// entry itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Successful outcome.
    Info,
    /// Caller-fault outcome.
    Warn,
    /// Server-fault outcome.
    Error,
}

/// Mutable per-call accumulator of structured log fields.
///
/// Lifecycle: created at call entry, mutated by middleware stages and
/// optionally by business logic, finalised exactly once by [`LogEntry::finish`].
/// A second `finish` is a no-op; the record is never emitted twice.
#[derive(Debug)]
pub struct LogEntry {
    correlation_id: Option<String>,
    groups: Vec<(String, Map<String, Value>)>,
    error: Option<String>,
    redaction: Redaction,
    concise: bool,
    finished: bool,
}

impl LogEntry {
    /// Create an empty entry with the call's redaction policy and
    /// verbosity.
    pub fn new(redaction: Redaction, concise: bool) -> Self {
        Self {
            correlation_id: None,
            groups: Vec::new(),
            error: None,
            redaction,
            concise,
            finished: false,
        }
    }

    /// Whether concise mode suppresses header/metadata groups.
    pub fn concise(&self) -> bool {
        self.concise
    }

    /// Record the call's correlation identifier.
    pub fn set_correlation_id(&mut self, id: &CorrelationId) {
        self.correlation_id = Some(id.as_str().to_string());
    }

    /// Append attributes to a group, creating the group on first use.
    ///
    /// Groups keep their insertion order in the emitted record.
    pub fn attach<K: Into<String>>(
        &mut self,
        group: &str,
        attrs: impl IntoIterator<Item = (K, Value)>,
    ) {
        let slot = self.group_mut(group);
        for (key, value) in attrs {
            slot.insert(key.into(), value);
        }
    }

    /// Append string attributes to a group, dropping every pair whose
    /// lower-cased key the redaction policy conceals.
    pub fn attach_redacted<K: Into<String>, V: Into<String>>(
        &mut self,
        group: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) {
        let filtered = self.filter_pairs(pairs);
        if filtered.is_empty() {
            return;
        }
        let slot = self.group_mut(group);
        for (key, value) in filtered {
            slot.insert(key, value);
        }
    }

    /// Insert a redacted key/value map as a single nested attribute of a
    /// group (e.g. the `headers` attribute of the `request` group).
    pub fn attach_nested_redacted<K: Into<String>, V: Into<String>>(
        &mut self,
        group: &str,
        attr: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) {
        let filtered = self.filter_pairs(pairs);
        let nested: Map<String, Value> = filtered.into_iter().collect();
        self.group_mut(group)
            .insert(attr.to_string(), Value::Object(nested));
    }

    /// Record the call's rendered error text. The last writer wins; the
    /// text is never a cause chain.
    pub fn record_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    /// The currently recorded error text.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The accumulated groups as one JSON object, in insertion order of the
    /// groups.
    pub fn as_value(&self) -> Value {
        let mut payload = Map::new();
        for (name, attrs) in &self.groups {
            payload.insert(name.clone(), Value::Object(attrs.clone()));
        }
        Value::Object(payload)
    }

    /// Emit the single structured record for this call.
    ///
    /// `message` is the transport's status line (e.g. `200 OK`); `duration`
    /// brackets the whole middleware chain. Only the first invocation
    /// emits.
    pub fn finish(&mut self, severity: Severity, message: &str, duration: Duration) {
        if self.finished {
            return;
        }
        self.finished = true;

        let entry = self.as_value();
        let id = self.correlation_id.as_deref().unwrap_or("");
        let error = self.error.as_deref().unwrap_or("");
        let duration_ms = duration.as_millis() as u64;

        match severity {
            Severity::Info => info!(
                target: "traceguard::request",
                id = %id,
                duration_ms,
                error = %error,
                entry = %entry,
                "{}",
                message
            ),
            Severity::Warn => warn!(
                target: "traceguard::request",
                id = %id,
                duration_ms,
                error = %error,
                entry = %entry,
                "{}",
                message
            ),
            Severity::Error => error!(
                target: "traceguard::request",
                id = %id,
                duration_ms,
                error = %error,
                entry = %entry,
                "{}",
                message
            ),
        }
    }

    fn group_mut(&mut self, name: &str) -> &mut Map<String, Value> {
        let position = match self.groups.iter().position(|(n, _)| n == name) {
            Some(position) => position,
            None => {
                self.groups.push((name.to_string(), Map::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[position].1
    }

    fn filter_pairs<K: Into<String>, V: Into<String>>(
        &self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Vec<(String, Value)> {
        pairs
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.into().to_lowercase();
                if self.redaction.conceals(&key) {
                    None
                } else {
                    Some((key, Value::String(value.into())))
                }
            })
            .collect()
    }
}

/// Cloneable handle to the call's [`LogEntry`].
///
/// One handle is installed in the request extensions by the logging
/// middleware; every clone refers to the same entry. The handle is the only
/// way downstream stages and business logic reach the entry.
#[derive(Debug, Clone)]
pub struct ActiveLog {
    inner: Arc<Mutex<LogEntry>>,
}

impl ActiveLog {
    /// Wrap an entry in a shareable handle.
    pub fn new(entry: LogEntry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(entry)),
        }
    }

    /// See [`LogEntry::concise`].
    pub fn concise(&self) -> bool {
        self.entry().concise()
    }

    /// See [`LogEntry::set_correlation_id`].
    pub fn set_correlation_id(&self, id: &CorrelationId) {
        self.entry().set_correlation_id(id);
    }

    /// See [`LogEntry::attach`].
    pub fn attach<K: Into<String>>(
        &self,
        group: &str,
        attrs: impl IntoIterator<Item = (K, Value)>,
    ) {
        self.entry().attach(group, attrs);
    }

    /// See [`LogEntry::attach_redacted`].
    pub fn attach_redacted<K: Into<String>, V: Into<String>>(
        &self,
        group: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) {
        self.entry().attach_redacted(group, pairs);
    }

    /// See [`LogEntry::attach_nested_redacted`].
    pub fn attach_nested_redacted<K: Into<String>, V: Into<String>>(
        &self,
        group: &str,
        attr: &str,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) {
        self.entry().attach_nested_redacted(group, attr, pairs);
    }

    /// See [`LogEntry::record_error`].
    pub fn record_error(&self, message: &str) {
        self.entry().record_error(message);
    }

    /// The currently recorded error text, if any.
    pub fn recorded_error(&self) -> Option<String> {
        self.entry().error().map(str::to_string)
    }

    /// See [`LogEntry::as_value`].
    pub fn as_value(&self) -> Value {
        self.entry().as_value()
    }

    /// See [`LogEntry::finish`].
    pub fn finish(&self, severity: Severity, message: &str, duration: Duration) {
        self.entry().finish(severity, message, duration);
    }

    fn entry(&self) -> std::sync::MutexGuard<'_, LogEntry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod entry_tests;

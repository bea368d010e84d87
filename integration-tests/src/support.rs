//! Shared test scaffolding

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// One event captured by the [`Recorder`].
#[derive(Debug, Clone)]
pub struct CapturedRecord {
    /// Event level.
    pub level: tracing::Level,
    /// Event target.
    pub target: String,
    /// Flattened fields, message included under `message`.
    pub fields: HashMap<String, String>,
}

impl CapturedRecord {
    /// The `entry` field parsed back into JSON.
    pub fn entry(&self) -> serde_json::Value {
        serde_json::from_str(&self.fields["entry"]).expect("entry field is JSON")
    }
}

/// Subscriber layer that collects every emitted event.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl Recorder {
    /// The per-call records emitted by the logging middleware.
    pub fn request_records(&self) -> Vec<CapturedRecord> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.target == "traceguard::request")
            .cloned()
            .collect()
    }
}

impl<S: tracing::Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedRecord {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0,
        });
    }
}

#[derive(Default)]
struct FieldCollector(HashMap<String, String>);

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Install a recording subscriber for the current thread and hand back the
/// recorder plus the guard keeping it active.
pub fn recording_subscriber() -> (Recorder, tracing::subscriber::DefaultGuard) {
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (recorder, guard)
}

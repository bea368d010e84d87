//! Per-call structured logging
//!
//! This crate provides the call-scoped observability state shared by every
//! transport:
//! - A [`LogEntry`] accumulator that folds a whole call into one structured
//!   record, emitted exactly once at the derived severity
//! - A [`Redaction`] policy that drops sensitive attribute keys from logs
//! - The [`CorrelationId`] attached to each inbound call
//! - Context helpers that let any layer, business logic included, enrich
//!   the active entry through the request extensions without holding a
//!   reference to it

pub mod context;
pub mod correlation;
pub mod entry;
pub mod init;
pub mod redaction;

pub use context::{active_log, attach_log_attrs, attach_log_error, correlation_id};
pub use correlation::CorrelationId;
pub use entry::{ActiveLog, LogEntry, Severity};
pub use init::{init, LogFormat, LoggingConfig, LoggingError};
pub use redaction::Redaction;

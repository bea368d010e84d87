//! Attribute-key redaction policy
//!
//! Keys are matched lower-cased and matching attributes are dropped
//! entirely rather than masked, so no substring of a credential can end up
//! in a log record.

use std::collections::HashSet;

/// Case-insensitive set of attribute keys suppressed from structured logs.
#[derive(Debug, Clone)]
pub struct Redaction {
    hidden: HashSet<String>,
    leak: bool,
}

impl Redaction {
    /// Build a policy from caller-supplied keys plus the transport's
    /// non-negotiable ones.
    ///
    /// The `always` keys are inserted regardless of what the caller
    /// configured. `leak` disables the whole policy and is meant for
    /// development environments only.
    pub fn new(
        sensitive: impl IntoIterator<Item = impl Into<String>>,
        always: &[&str],
        leak: bool,
    ) -> Self {
        let mut hidden: HashSet<String> = sensitive
            .into_iter()
            .map(|key| key.into().to_lowercase())
            .collect();
        for key in always {
            hidden.insert((*key).to_lowercase());
        }
        Self { hidden, leak }
    }

    /// Whether an attribute with this (already lower-cased) key must be
    /// dropped.
    pub fn conceals(&self, key: &str) -> bool {
        !self.leak && self.hidden.contains(key)
    }
}

#[cfg(test)]
#[path = "redaction_tests.rs"]
mod redaction_tests;

//! The greeting service

use std::sync::Arc;

use traceguard_errors::BoxError;

use crate::repository::MessageRepository;
use crate::validation::{self, SayParams};

/// Resolves greetings by id and answers them in every language at once.
///
/// Errors come back classified, so both transports render them through the
/// shared taxonomy without further inspection.
#[derive(Clone)]
pub struct GreeterService {
    repository: Arc<dyn MessageRepository>,
}

impl GreeterService {
    /// Create a service over the given repository.
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// Look up the greeting registered under `id`.
    pub async fn say(&self, id: &str) -> Result<String, BoxError> {
        validation::validate(&SayParams { id: id.to_string() })?;

        let message = self.repository.get(id)?;
        Ok(format!(
            "{}, {}, {}",
            message.english, message.french, message.malagasy
        ))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;

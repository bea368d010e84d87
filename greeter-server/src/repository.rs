//! In-memory greeting storage

use std::collections::HashMap;
use std::sync::RwLock;

use traceguard_errors::ClassifiedError;

/// A greeting in every language the service speaks.
#[derive(Debug, Clone)]
pub struct Message {
    /// Lookup key.
    pub id: String,
    /// English variant.
    pub english: String,
    /// French variant.
    pub french: String,
    /// Malagasy variant.
    pub malagasy: String,
}

/// Lookup interface the service depends on.
pub trait MessageRepository: Send + Sync {
    /// Fetch the greeting registered under `id`.
    fn get(&self, id: &str) -> Result<Message, ClassifiedError>;
}

/// Map-backed repository, seeded with the demo entries.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    messages: RwLock<HashMap<String, Message>>,
}

impl InMemoryRepository {
    /// Build a repository holding the demo greetings.
    pub fn seeded() -> Self {
        let repository = Self::default();
        for message in [
            Message {
                id: "hello".to_string(),
                english: "Hello".to_string(),
                french: "Bonjour".to_string(),
                malagasy: "Salama".to_string(),
            },
            Message {
                id: "goodbye".to_string(),
                english: "Good bye".to_string(),
                french: "Au revoir".to_string(),
                malagasy: "Veloma".to_string(),
            },
        ] {
            repository.insert(message);
        }
        repository
    }

    /// Register a greeting, replacing any previous entry with the same id.
    pub fn insert(&self, message: Message) {
        self.lock_write().insert(message.id.clone(), message);
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Message>> {
        self.messages
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageRepository for InMemoryRepository {
    fn get(&self, id: &str) -> Result<Message, ClassifiedError> {
        let messages = self
            .messages
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages
            .get(id)
            .cloned()
            .ok_or_else(|| ClassifiedError::not_found("message not found"))
    }
}

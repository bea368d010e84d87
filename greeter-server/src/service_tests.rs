//! Unit tests for the greeting service

#[cfg(test)]
mod tests {
    use super::super::GreeterService;
    use crate::repository::InMemoryRepository;

    use std::sync::Arc;

    use traceguard_errors::{classify, ErrorKind};

    fn service() -> GreeterService {
        GreeterService::new(Arc::new(InMemoryRepository::seeded()))
    }

    #[tokio::test]
    async fn known_id_joins_all_three_languages() {
        let greeting = service().say("hello").await.unwrap();
        assert_eq!(greeting, "Hello, Bonjour, Salama");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let err = service().say("unknown-id").await.unwrap_err();
        assert_eq!(classify(err.as_ref()), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "message not found");
    }

    #[tokio::test]
    async fn empty_id_fails_validation() {
        let err = service().say("").await.unwrap_err();
        assert_eq!(classify(err.as_ref()), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "Id field required");
    }
}

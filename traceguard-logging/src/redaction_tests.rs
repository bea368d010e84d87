//! Unit tests for the redaction policy

#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn hard_coded_keys_win_over_an_empty_caller_set() {
        let redaction = Redaction::new(
            Vec::<String>::new(),
            &["authorization", "cookie", "set-cookie"],
            false,
        );

        assert!(redaction.conceals("authorization"));
        assert!(redaction.conceals("cookie"));
        assert!(redaction.conceals("set-cookie"));
        assert!(!redaction.conceals("accept"));
    }

    #[test]
    fn caller_keys_are_lowercased() {
        let redaction = Redaction::new(["X-Api-Key"], &["authorization"], false);

        assert!(redaction.conceals("x-api-key"));
        assert!(redaction.conceals("authorization"));
    }

    #[test]
    fn leak_mode_disables_everything() {
        let redaction = Redaction::new(["x-api-key"], &["authorization"], true);

        assert!(!redaction.conceals("authorization"));
        assert!(!redaction.conceals("x-api-key"));
    }
}

//! Request validation
//!
//! Wraps `validator` so that failing rules surface as classified errors:
//! one failing rule becomes a single `InvalidArgument` error, several
//! become a group under the same kind. Messages read `<Field> <rule text>`
//! (e.g. `Id field required`).

use validator::{Validate, ValidationErrors};

use traceguard_errors::{BoxError, ClassifiedError, ClassifiedErrorGroup, ErrorKind};

/// Validated parameters of the `say` operation.
#[derive(Debug, Validate)]
pub struct SayParams {
    /// The greeting id; required.
    #[validate(length(min = 1, message = "field required"))]
    pub id: String,
}

/// Run validation, converting failures into classified errors.
pub fn validate(params: &impl Validate) -> Result<(), BoxError> {
    params.validate().map_err(into_classified)
}

fn into_classified(errors: ValidationErrors) -> BoxError {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let name: &str = field.as_ref();
        for error in field_errors.iter() {
            let detail = match &error.message {
                Some(message) => message.to_string(),
                None => format!("failed on {}", error.code),
            };
            messages.push(format!("{} {}", capitalize(name), detail));
        }
    }

    if messages.len() == 1 {
        Box::new(ClassifiedError::invalid_argument(messages.remove(0)))
    } else {
        Box::new(ClassifiedErrorGroup::from_messages(
            ErrorKind::InvalidArgument,
            messages,
        ))
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

//! Transport-neutral error taxonomy
//!
//! This crate is the single source of truth for error classification across
//! the HTTP and gRPC surfaces:
//! - A closed set of error kinds with total status-code mappings
//! - Classified error values that separate wire-visible text from the
//!   diagnostic cause chain
//! - Chain-walking classification for errors produced by layers that do not
//!   classify their own failures

use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use tonic::{Code, Status};

/// Boxed error type accepted at the transport boundary.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Closed set of error kinds shared by every transport.
///
/// Every error that crosses a transport boundary resolves to exactly one
/// kind; errors without an embedded kind resolve to [`ErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied an argument that fails validation.
    InvalidArgument,
    /// The requested entity does not exist.
    NotFound,
    /// The caller is not authenticated.
    Unauthenticated,
    /// The caller is authenticated but not allowed.
    PermissionDenied,
    /// The server failed in a way the caller cannot fix.
    Internal,
    /// The entity the caller tried to create already exists.
    AlreadyExists,
    /// The operation is not implemented on this server.
    Unimplemented,
    /// The error carried no classification.
    Unknown,
}

impl ErrorKind {
    /// Map the kind to its HTTP status code.
    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            ErrorKind::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map the kind to its canonical gRPC status code.
    pub fn rpc_code(self) -> Code {
        match self {
            ErrorKind::InvalidArgument => Code::InvalidArgument,
            ErrorKind::NotFound => Code::NotFound,
            ErrorKind::Unauthenticated => Code::Unauthenticated,
            ErrorKind::PermissionDenied => Code::PermissionDenied,
            ErrorKind::Internal => Code::Internal,
            ErrorKind::AlreadyExists => Code::AlreadyExists,
            ErrorKind::Unimplemented => Code::Unimplemented,
            ErrorKind::Unknown => Code::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Unauthenticated => "Unauthenticated",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::Internal => "Internal",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::Unimplemented => "Unimplemented",
            ErrorKind::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// An error value carrying an explicit [`ErrorKind`].
///
/// The wire-visible text is exactly [`ClassifiedError::message`]; the cause
/// chain reached through [`StdError::source`] is for local diagnostics only
/// and is never serialized to a response.
#[derive(Debug, thiserror::Error)]
pub struct ClassifiedError {
    kind: ErrorKind,
    message: Option<String>,
    #[source]
    cause: Option<BoxError>,
}

impl ClassifiedError {
    /// Create a classified error with a plain message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            cause: None,
        }
    }

    /// Wrap an existing error under a kind.
    ///
    /// The wrapped error's own text becomes the wire-visible message; its
    /// deeper sources stay log-only.
    pub fn wrap(kind: ErrorKind, cause: impl Into<BoxError>) -> Self {
        Self {
            kind,
            message: None,
            cause: Some(cause.into()),
        }
    }

    /// Shorthand for an [`ErrorKind::InvalidArgument`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Shorthand for an [`ErrorKind::NotFound`] error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Shorthand for an [`ErrorKind::Internal`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// The embedded kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The wire-visible text: the message, or the direct cause's own text.
    ///
    /// Empty when the error was built from a bare kind; callers render a
    /// status-only response in that case.
    pub fn message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.cause {
            Some(cause) => cause.to_string(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<ErrorKind> for ClassifiedError {
    /// A bare kind classifies without contributing wire-visible text.
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            cause: None,
        }
    }
}

/// Several causes classified under one shared [`ErrorKind`].
///
/// Rendered as a list of messages on the wire. A group that lost all of its
/// causes at construction still carries the kind: it stays an error, it
/// just renders an empty list.
#[derive(Debug, thiserror::Error)]
pub struct ClassifiedErrorGroup {
    kind: ErrorKind,
    causes: Vec<BoxError>,
}

impl ClassifiedErrorGroup {
    /// Build a group from optional causes, silently dropping the absent
    /// ones while preserving the relative order of the rest.
    pub fn from_causes(
        kind: ErrorKind,
        causes: impl IntoIterator<Item = Option<BoxError>>,
    ) -> Self {
        Self {
            kind,
            causes: causes.into_iter().flatten().collect(),
        }
    }

    /// Build a group from plain messages.
    pub fn from_messages(
        kind: ErrorKind,
        messages: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            kind,
            causes: messages
                .into_iter()
                .map(|m| BoxError::from(m.into()))
                .collect(),
        }
    }

    /// The shared kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Wire-visible texts of the surviving causes, in construction order.
    pub fn messages(&self) -> Vec<String> {
        self.causes.iter().map(|c| c.to_string()).collect()
    }

    /// Number of surviving causes.
    pub fn len(&self) -> usize {
        self.causes.len()
    }

    /// Whether the group carries no causes.
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }
}

impl fmt::Display for ClassifiedErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join(", "))
    }
}

/// A borrowed view of whichever classified value an error chain contains.
#[derive(Debug)]
pub enum ClassifiedRef<'a> {
    /// A single classified error.
    Single(&'a ClassifiedError),
    /// A classified group.
    Group(&'a ClassifiedErrorGroup),
}

/// Walk the source chain and return the first classified value, if any.
pub fn find_classified<'a>(err: &'a (dyn StdError + 'static)) -> Option<ClassifiedRef<'a>> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(single) = e.downcast_ref::<ClassifiedError>() {
            return Some(ClassifiedRef::Single(single));
        }
        if let Some(group) = e.downcast_ref::<ClassifiedErrorGroup>() {
            return Some(ClassifiedRef::Group(group));
        }
        current = e.source();
    }
    None
}

/// Resolve an error to its kind, falling back to [`ErrorKind::Unknown`].
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorKind {
    match find_classified(err) {
        Some(ClassifiedRef::Single(e)) => e.kind(),
        Some(ClassifiedRef::Group(g)) => g.kind(),
        None => ErrorKind::Unknown,
    }
}

impl From<&ClassifiedError> for Status {
    fn from(err: &ClassifiedError) -> Self {
        Status::new(err.kind().rpc_code(), err.message())
    }
}

impl From<&ClassifiedErrorGroup> for Status {
    fn from(err: &ClassifiedErrorGroup) -> Self {
        Status::new(err.kind().rpc_code(), err.messages().join(", "))
    }
}

//! Error rendering for the gRPC wire format

use std::error::Error as StdError;

use tonic::{Code, Status};

use traceguard_errors::{find_classified, ClassifiedRef};
use traceguard_logging::ActiveLog;

/// Render a handler error as a [`Status`] and route its text into the log.
///
/// The classified message (or the group's joined messages) becomes the
/// status message; unclassified errors degrade to a bare `Unknown` with the
/// raw text kept log-only.
pub fn render_status(log: Option<&ActiveLog>, err: &(dyn StdError + 'static)) -> Status {
    if let Some(log) = log {
        log.record_error(&err.to_string());
    }

    match find_classified(err) {
        Some(ClassifiedRef::Single(classified)) => Status::from(classified),
        Some(ClassifiedRef::Group(group)) => Status::from(group),
        None => Status::new(Code::Unknown, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traceguard_errors::{ClassifiedError, ClassifiedErrorGroup, ErrorKind};
    use traceguard_logging::{ActiveLog, LogEntry, Redaction};

    fn log() -> ActiveLog {
        ActiveLog::new(LogEntry::new(
            Redaction::new(Vec::<String>::new(), &[], false),
            false,
        ))
    }

    #[test]
    fn classified_error_maps_to_its_code() {
        let log = log();
        let err = ClassifiedError::not_found("message not found");

        let status = render_status(Some(&log), &err);

        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "message not found");
        assert_eq!(log.recorded_error().as_deref(), Some("message not found"));
    }

    #[test]
    fn group_joins_its_messages() {
        let err = ClassifiedErrorGroup::from_messages(ErrorKind::InvalidArgument, ["a", "b"]);

        let status = render_status(None, &err);

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "a, b");
    }

    #[test]
    fn unclassified_error_degrades_to_unknown() {
        let log = log();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "downstream exploded");

        let status = render_status(Some(&log), &err);

        assert_eq!(status.code(), Code::Unknown);
        assert_eq!(status.message(), "");
        assert_eq!(
            log.recorded_error().as_deref(),
            Some("downstream exploded")
        );
    }
}

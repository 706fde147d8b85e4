use thiserror::Error;

use crate::types::RecordId;

/// Caller input that cannot be accepted as-is. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were absent on create.
    #[error("Missing data for required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// An update payload carried no recognised field.
    #[error("No update data provided")]
    EmptyUpdate,

    /// The interval pushes the next revision date past the representable range.
    #[error("current_interval_days {0} is out of range")]
    IntervalOutOfRange(u32),

    /// A path identifier that is neither a sequence number nor a UUID.
    #[error("Invalid identifier format: {0}")]
    MalformedId(String),
}

/// Outcome taxonomy shared by every repository and record service.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No live record carries this id.
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: RecordId },

    /// The backend failed or returned data it could not have written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl RecordError {
    /// Short error code string sent to HTTP clients next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::Validation(_) => "VALIDATION_ERROR",
            RecordError::NotFound { .. } => "NOT_FOUND",
            RecordError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    pub(crate) fn not_found(kind: &'static str, id: &RecordId) -> Self {
        RecordError::NotFound {
            kind,
            id: id.clone(),
        }
    }
}

impl From<rusqlite::Error> for RecordError {
    fn from(e: rusqlite::Error) -> Self {
        RecordError::StorageUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_names_every_field() {
        let err = ValidationError::MissingFields(vec!["position", "department"]);
        assert_eq!(
            err.to_string(),
            "Missing data for required fields: position, department"
        );
    }

    #[test]
    fn not_found_message_and_code() {
        let err = RecordError::not_found("employee", &RecordId::Seq(999));
        assert_eq!(err.to_string(), "employee with id 999 not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn sqlite_errors_surface_as_storage_unavailable() {
        let err: RecordError = rusqlite::Error::InvalidQuery.into();
        assert_eq!(err.code(), "STORAGE_UNAVAILABLE");
    }
}

//! Translation of record outcomes into HTTP error responses.
//!
//! Every error body has the same shape: `{"error": "<message>", "code": "<CODE>"}`.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use revisit_records::{RecordError, RecordId};
use serde_json::{json, Value};
use tracing::{error, warn};

pub type ApiError = (StatusCode, Json<Value>);

pub fn record_error(err: RecordError) -> ApiError {
    let status = match &err {
        RecordError::Validation(_) => StatusCode::BAD_REQUEST,
        RecordError::NotFound { .. } => StatusCode::NOT_FOUND,
        RecordError::StorageUnavailable(_) => {
            error!(error = %err, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(json!({"error": err.to_string(), "code": err.code()})),
    )
}

/// A body that is not JSON, or not the expected JSON shape.
pub fn body_error(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection.body_text(), "rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": rejection.body_text(), "code": "INVALID_BODY"})),
    )
}

/// Path identifier, either a sequence number or a UUID.
pub fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>().map_err(|e| record_error(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revisit_records::ValidationError;

    #[test]
    fn status_follows_error_kind() {
        let (status, _) = record_error(ValidationError::EmptyUpdate.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, Json(body)) = record_error(RecordError::NotFound {
            kind: "question",
            id: RecordId::Seq(4),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "question with id 4 not found");

        let (status, Json(body)) =
            record_error(RecordError::StorageUnavailable("disk I/O error".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORAGE_UNAVAILABLE");
    }
}

//! Spaced-repetition question endpoints under /questions.
//!
//! The collection GET returns only questions due now. A PUT that carries
//! `current_interval_days` moves the question's `next_revision_date` to that
//! many days from the time of the request.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use revisit_records::{NewQuestion, Question, QuestionPatch};
use std::sync::Arc;

use super::error::{body_error, parse_id, record_error, ApiError};
use crate::app::AppState;

/// POST /questions
pub async fn create_question(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewQuestion>, JsonRejection>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    let Json(input) = payload.map_err(body_error)?;
    let question = state
        .questions
        .create_record(input)
        .await
        .map_err(record_error)?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// GET /questions: questions due for review right now.
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let due = state
        .questions
        .list_records(Utc::now())
        .await
        .map_err(record_error)?;
    Ok(Json(due))
}

/// GET /questions/{id}
pub async fn get_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Question>, ApiError> {
    let id = parse_id(&id)?;
    let question = state.questions.get_record(&id).await.map_err(record_error)?;
    Ok(Json(question))
}

/// PUT /questions/{id}
pub async fn update_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<QuestionPatch>, JsonRejection>,
) -> Result<Json<Question>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(body_error)?;
    let question = state
        .questions
        .update_record(&id, patch)
        .await
        .map_err(record_error)?;
    Ok(Json(question))
}

/// DELETE /questions/{id}
pub async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state
        .questions
        .delete_record(&id)
        .await
        .map_err(record_error)?;
    Ok(StatusCode::NO_CONTENT)
}

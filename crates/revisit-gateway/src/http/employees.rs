//! Employee directory endpoints under /employees.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use revisit_records::{Employee, EmployeePatch, NewEmployee};
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::{body_error, parse_id, record_error, ApiError};
use crate::app::AppState;

/// POST /employees
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let Json(input) = payload.map_err(body_error)?;
    let employee = state
        .employees
        .create_record(input)
        .await
        .map_err(record_error)?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /employees
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = state
        .employees
        .list_records(Utc::now())
        .await
        .map_err(record_error)?;
    Ok(Json(employees))
}

/// GET /employees/{id}
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    let id = parse_id(&id)?;
    let employee = state.employees.get_record(&id).await.map_err(record_error)?;
    Ok(Json(employee))
}

/// PUT /employees/{id}
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<EmployeePatch>, JsonRejection>,
) -> Result<Json<Employee>, ApiError> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(body_error)?;
    let employee = state
        .employees
        .update_record(&id, patch)
        .await
        .map_err(record_error)?;
    Ok(Json(employee))
}

/// DELETE /employees/{id}
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state
        .employees
        .delete_record(&id)
        .await
        .map_err(record_error)?;
    Ok(Json(json!({"message": "Employee deleted successfully"})))
}

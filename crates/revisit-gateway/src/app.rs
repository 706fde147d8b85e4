use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use revisit_core::config::{CorsConfig, RevisitConfig};
use revisit_records::{Employee, Question, RecordService};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::http::{employees, health, questions};

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: RevisitConfig,
    pub employees: RecordService<Employee>,
    pub questions: RecordService<Question>,
}

impl AppState {
    pub fn new(
        config: RevisitConfig,
        employees: RecordService<Employee>,
        questions: RecordService<Question>,
    ) -> Self {
        Self {
            config,
            employees,
            questions,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors);
    let question_collection = get(questions::list_questions).post(questions::create_question);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/{id}",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        // the review frontend calls the collection with a trailing slash
        .route("/questions", question_collection.clone())
        .route("/questions/", question_collection)
        .route(
            "/questions/{id}",
            get(questions::get_question)
                .put(questions::update_question)
                .delete(questions::delete_question),
        )
        .with_state(state)
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Browser access for the configured frontends, cookies included.
///
/// Credentials rule out `*`, so methods and headers mirror the preflight.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) if origin != "*" => Some(value),
            _ => {
                warn!(origin = %origin, "ignoring unusable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use revisit_records::db::ConnectionPool;
    use revisit_records::{MemoryRepository, SqliteEmployeeRepository, SqliteQuestionRepository};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        let state = AppState::new(
            RevisitConfig::default(),
            RecordService::new(Arc::new(MemoryRepository::<Employee>::new())),
            RecordService::new(Arc::new(MemoryRepository::<Question>::new())),
        );
        build_router(Arc::new(state))
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let (status, body) = send(&router(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn employee_crud_over_http() {
        let app = router();

        let (status, created) = send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({"name": "Alice", "position": "Engineer", "department": "Tech"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 1);
        assert_eq!(created["name"], "Alice");

        let (status, listed) = send(&app, Method::GET, "/employees", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/employees/1",
            Some(json!({"position": "Senior Engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["position"], "Senior Engineer");
        assert_eq!(updated["department"], "Tech");

        let (status, body) = send(&app, Method::DELETE, "/employees/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Employee deleted successfully");

        let (status, body) = send(&app, Method::GET, "/employees/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn missing_fields_are_named_in_400() {
        let (status, body) = send(
            &router(),
            Method::POST,
            "/employees",
            Some(json!({"name": "David"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Missing data for required fields: position, department"
        );
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let app = router();
        send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({"name": "Alice", "position": "Engineer", "department": "Tech"})),
        )
        .await;
        let (status, body) = send(&app, Method::PUT, "/employees/1", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No update data provided");
    }

    #[tokio::test]
    async fn malformed_json_and_ids_are_400() {
        let app = router();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/employees")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/questions/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn question_review_over_http() {
        let app = router();
        let yesterday = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339();

        let (status, created) = send(
            &app,
            Method::POST,
            "/questions/",
            Some(json!({
                "question_text": "What is a trait object?",
                "solution": "A dyn-dispatched value behind a pointer.",
                "next_revision_date": yesterday,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["current_interval_days"], 0);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, due) = send(&app, Method::GET, "/questions/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(due.as_array().map(Vec::len), Some(1));

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/questions/{id}"),
            Some(json!({"current_interval_days": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["current_interval_days"], 2);

        let (_, due) = send(&app, Method::GET, "/questions", None).await;
        assert_eq!(due.as_array().map(Vec::len), Some(0));

        let (status, body) = send(&app, Method::DELETE, &format!("/questions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, &format!("/questions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight_allows_frontend_with_credentials() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/questions/")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        let resp = router().oneshot(req).await.unwrap();
        let headers = resp.headers();

        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "PUT");
    }

    #[tokio::test]
    async fn backend_failure_is_a_500_with_storage_code() {
        let pool = Arc::new(ConnectionPool::in_memory().unwrap());
        let state = AppState::new(
            RevisitConfig::default(),
            RecordService::new(Arc::new(SqliteEmployeeRepository::new(Arc::clone(&pool)))),
            RecordService::new(Arc::new(SqliteQuestionRepository::new(Arc::clone(&pool)))),
        );
        let app = build_router(Arc::new(state));
        pool.write(|db| Ok(db.execute_batch("DROP TABLE employees")?))
            .await
            .unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            "/employees",
            Some(json!({"name": "Alice", "position": "Engineer", "department": "Tech"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORAGE_UNAVAILABLE");

        let (status, body) = send(&app, Method::GET, "/employees", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORAGE_UNAVAILABLE");

        // the other table is untouched
        let (status, _) = send(&app, Method::GET, "/questions", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

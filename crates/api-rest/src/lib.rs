//! # API REST
//!
//! REST API for echo hemodynamics.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, static files for the browser client)
//!
//! Uses `api-shared` for the wire types and `echo-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use api_shared::wire;
use axum::routing::{get, post};
use axum::Router;
use echo_core::HemodynamicService;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};

/// Application state shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: HemodynamicService,
}

impl AppState {
    pub fn new(service: HemodynamicService) -> Self {
        Self { service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_patient,
        handlers::save_patient,
        handlers::list_examinations,
        handlers::save_examination,
        handlers::calculate_examination,
    ),
    components(schemas(
        wire::HealthRes,
        wire::MessageRes,
        wire::ErrorRes,
        wire::PatientBody,
        wire::ExaminationBody,
        wire::MeasurementForm,
        wire::CalculateReq,
        wire::CalculateRes,
        wire::MetricsRes,
        wire::UrineOutputRes,
    ))
)]
pub struct ApiDoc;

/// Builds the application router.
///
/// When `static_dir` is given, requests that match no API route are served from it (the browser
/// client lives there).
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/patients", post(handlers::save_patient))
        .route("/api/patients/:rm", get(handlers::get_patient))
        .route(
            "/api/examinations",
            get(handlers::list_examinations).post(handlers::save_examination),
        )
        .route(
            "/api/examinations/calculate",
            post(handlers::calculate_examination),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    if let Some(dir) = static_dir {
        tracing::info!("serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use echo_core::MemoryStore;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let service = HemodynamicService::new(store.clone(), store);
        router(AppState::new(service), None)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn patient_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Budi",
            "rm": "RM-001",
            "weight": 70,
            "height": 170,
            "lvotDiameter": 2.0
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = test_app().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ok"], true);
    }

    #[tokio::test]
    async fn unknown_patient_returns_404_body() {
        let response = test_app()
            .oneshot(get_request("/api/patients/RM-404"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Patient not found" })
        );
    }

    #[tokio::test]
    async fn saved_patient_can_be_fetched() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/patients", patient_json()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Patient data saved");

        let response = app
            .oneshot(get_request("/api/patients/RM-001"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Budi");
        assert_eq!(body["lvotDiameter"], 2.0);
    }

    #[tokio::test]
    async fn invalid_patient_is_bad_request() {
        let mut body = patient_json();
        body["weight"] = serde_json::json!(0);
        let response = test_app()
            .oneshot(json_request("POST", "/api/patients", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn posted_examinations_are_listed_newest_first() {
        let app = test_app();
        for (timestamp, report) in [("20240307-0800", "first"), ("20240307-0900", "second")] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/examinations",
                    serde_json::json!({ "timestamp": timestamp, "formattedOutput": report }),
                ))
                .await
                .unwrap();
            assert_eq!(body_json(response).await["message"], "Examination data saved");
        }

        let response = app.oneshot(get_request("/api/examinations")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0]["formattedOutput"], "second");
        assert_eq!(body[1]["formattedOutput"], "first");
    }

    #[tokio::test]
    async fn calculate_records_examination() {
        let app = test_app();
        app.clone()
            .oneshot(json_request("POST", "/api/patients", patient_json()))
            .await
            .unwrap();

        let request = serde_json::json!({
            "rm": "RM-001",
            "measurements": {
                "tds": "120", "tdd": "80", "hr": "80",
                "lvotVti": "20", "ivcMax": "2,0", "ivcMin": "1"
            }
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/examinations/calculate", request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["metrics"]["erap"], 8.0);
        assert_eq!(body["metrics"]["erapCategory"], "Intermediate");
        assert!(body["examination"]["formattedOutput"]
            .as_str()
            .unwrap()
            .contains("eRAP: 8 mmHg (2 / 1)"));

        let response = app.oneshot(get_request("/api/examinations")).await.unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn calculate_rejects_missing_required_reading() {
        let app = test_app();
        app.clone()
            .oneshot(json_request("POST", "/api/patients", patient_json()))
            .await
            .unwrap();

        let request = serde_json::json!({
            "rm": "RM-001",
            "measurements": { "tds": "120", "tdd": "80", "lvotVti": "20", "ivcMax": "2", "ivcMin": "1" }
        });
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/examinations/calculate", request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("hr"));

        let response = app.oneshot(get_request("/api/examinations")).await.unwrap();
        assert!(body_json(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn calculate_for_unknown_patient_is_404() {
        let request = serde_json::json!({ "rm": "RM-404", "measurements": {} });
        let response = test_app()
            .oneshot(json_request("POST", "/api/examinations/calculate", request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = test_app()
            .oneshot(get_request("/api-docs/openapi.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/api/examinations/calculate"].is_object());
    }

    #[tokio::test]
    async fn static_files_are_served_as_fallback() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("index.html"), "<h1>echo</h1>")
            .expect("write index");

        let store = Arc::new(MemoryStore::new());
        let service = HemodynamicService::new(store.clone(), store);
        let app = router(AppState::new(service), Some(temp_dir.path().to_path_buf()));

        let response = app.oneshot(get_request("/index.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"<h1>echo</h1>");
    }
}

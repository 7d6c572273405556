pub mod health;
pub mod pdf;
pub mod resumes;
pub mod suggestion;

use axum::{
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Ids that are not UUIDs cannot name a stored resume, so they are reported
/// as not found rather than as a malformed request.
pub(crate) fn parse_resume_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::resume_not_found())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::banner_handler))
        .route("/health", get(health::health_handler))
        // Resume CRUD
        .route(
            "/api/resumes",
            get(resumes::handle_list).post(resumes::handle_create),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get)
                .put(resumes::handle_update)
                .delete(resumes::handle_delete),
        )
        // Document export
        .route("/api/pdf/:id", get(pdf::handle_export_pdf))
        .route("/documents/:id", get(pdf::handle_export_pdf))
        // Suggestions
        .route("/api/suggestion", post(suggestion::handle_suggest))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
        routing::post,
        Json,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, DEFAULT_LLM_MODEL};
    use crate::llm_client::tests::{completion, spawn_mock};
    use crate::llm_client::LlmClient;
    use crate::render::modern::BRAND_COLOR;
    use crate::render::tests::{fills_with, shows};
    use crate::store::MemoryResumeStore;

    fn test_state(llm_url: &str, api_key: Option<&str>) -> AppState {
        let config = Config {
            database_url: None,
            llm_api_key: api_key.map(str::to_string),
            llm_api_url: llm_url.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            port: 0,
            rust_log: "info".to_string(),
        };
        AppState {
            store: Arc::new(MemoryResumeStore::new()),
            llm: LlmClient::from_config(&config).unwrap(),
            config,
        }
    }

    fn app() -> Router {
        build_router(test_state("http://127.0.0.1:1", None))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    fn jane() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@x.com",
            "phone": "555-1234",
            "summary": "",
            "education": [],
            "experience": [{
                "company": "Acme",
                "role": "Engineer",
                "duration": "2020-2023",
                "description": "Built things"
            }],
            "skills": ["Go"]
        })
    }

    async fn create_jane(app: &Router) -> String {
        let response = send(app, "POST", "/api/resumes", Some(jane())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_banner_and_health() {
        let app = app();
        let banner = send(&app, "GET", "/", None).await;
        assert_eq!(banner.status(), StatusCode::OK);
        let health = body_json(send(&app, "GET", "/health", None).await).await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["storage"], "memory");
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let app = app();
        let response = send(&app, "POST", "/api/resumes", Some(json!({"email": "x@y.z"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let app = app();
        let id = create_jane(&app).await;

        let listed = body_json(send(&app, "GET", "/api/resumes", None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let fetched = body_json(send(&app, "GET", &format!("/api/resumes/{id}"), None).await).await;
        assert_eq!(fetched["name"], "Jane Doe");
        assert!(fetched["updatedAt"].is_string());

        let updated = send(
            &app,
            "PUT",
            &format!("/api/resumes/{id}"),
            Some(json!({"skills": ["Go", "Rust"]})),
        )
        .await;
        assert_eq!(updated.status(), StatusCode::OK);
        let updated = body_json(updated).await;
        assert_eq!(updated["skills"], json!(["Go", "Rust"]));
        assert_eq!(updated["email"], "jane@x.com");

        let deleted = send(&app, "DELETE", &format!("/api/resumes/{id}"), None).await;
        assert_eq!(body_json(deleted).await["message"], "Resume deleted");

        let gone = send(&app, "GET", &format!("/api/resumes/{id}"), None).await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    async fn assert_validation_error(response: Response) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_mistyped_body_is_json_400() {
        let app = app();
        let response = send(&app, "POST", "/api/resumes", Some(json!({"name": 5}))).await;
        assert_validation_error(response).await;

        let id = create_jane(&app).await;
        let response = send(
            &app,
            "PUT",
            &format!("/api/resumes/{id}"),
            Some(json!({"skills": "Go"})),
        )
        .await;
        assert_validation_error(response).await;
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_400() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/resumes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_validation_error(response).await;
    }

    #[tokio::test]
    async fn test_suggestion_missing_text_is_json_400() {
        let app = app();
        let response = send(
            &app,
            "POST",
            "/api/suggestion",
            Some(json!({"userName": "Jane"})),
        )
        .await;
        assert_validation_error(response).await;
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let app = app();
        let id = create_jane(&app).await;
        let response = send(
            &app,
            "PUT",
            &format!("/api/resumes/{id}"),
            Some(json!({"name": " "})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids_are_404() {
        let app = app();
        let unknown = format!("/api/resumes/{}", Uuid::new_v4());
        assert_eq!(send(&app, "GET", &unknown, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            send(&app, "DELETE", &unknown, None).await.status(),
            StatusCode::NOT_FOUND
        );
        let malformed = send(&app, "GET", "/api/pdf/not-a-uuid", None).await;
        assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
        let json = body_json(malformed).await;
        assert_eq!(json["error"]["message"], "Resume not found");
    }

    #[tokio::test]
    async fn test_pdf_export_streams_classic_document() {
        let app = app();
        let id = create_jane(&app).await;
        let response = send(&app, "GET", &format!("/api/pdf/{id}?template=classic"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=Jane_Doe_resume.pdf"
        );
        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(shows(&bytes, "Engineer at Acme (2020-2023)"));
        assert!(!fills_with(&bytes, BRAND_COLOR));
    }

    #[tokio::test]
    async fn test_documents_route_selects_modern() {
        let app = app();
        let id = create_jane(&app).await;
        let modern = body_bytes(
            send(&app, "GET", &format!("/documents/{id}?template=modern"), None).await,
        )
        .await;
        let fallback = body_bytes(
            send(&app, "GET", &format!("/documents/{id}?template=Modern"), None).await,
        )
        .await;
        let default = body_bytes(send(&app, "GET", &format!("/documents/{id}"), None).await).await;
        assert!(fills_with(&modern, BRAND_COLOR));
        assert_eq!(fallback, default);
        assert_ne!(modern, default);
    }

    #[tokio::test]
    async fn test_export_reflects_latest_update() {
        let app = app();
        let id = create_jane(&app).await;
        send(
            &app,
            "PUT",
            &format!("/api/resumes/{id}"),
            Some(json!({"skills": ["Haskell"]})),
        )
        .await;
        let bytes = body_bytes(send(&app, "GET", &format!("/api/pdf/{id}"), None).await).await;
        assert!(shows(&bytes, "Haskell"));
    }

    #[tokio::test]
    async fn test_suggestion_without_key_is_500() {
        let app = app();
        let response = send(
            &app,
            "POST",
            "/api/suggestion",
            Some(json!({"resumeText": "Engineer", "userName": "Jane"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_suggestion_rejects_blank_text() {
        let app = app();
        let response = send(
            &app,
            "POST",
            "/api/suggestion",
            Some(json!({"resumeText": "  ", "userName": "Jane"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_suggestion_proxies_model_output() {
        let mock = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(completion("Lead with outcomes.")) }),
        );
        let url = spawn_mock(mock).await;
        let app = build_router(test_state(&url, Some("key")));
        let response = send(
            &app,
            "POST",
            "/api/suggestion",
            Some(json!({"resumeText": "Engineer at Acme", "userName": "Jane"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["suggestion"], "Lead with outcomes.");
    }
}

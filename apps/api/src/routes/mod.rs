pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

/// Transport-level body cap. Sits above the 10 MiB upload ceiling so that
/// oversized files reach validation and get a descriptive 400.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/api/test-connection",
            get(health::test_connection_handler),
        )
        .route("/api/upload", post(handlers::handle_upload))
        .route("/api/process", post(handlers::handle_process))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::imaging::testing::{FakeConverter, FakeRasterizer};
    use crate::llm_client::testing::ScriptedBackend;

    const BOUNDARY: &str = "resumegpt-test-boundary";
    const JANE: &str = r#"{"personal_info": {"name": "Jane Doe"}}"#;

    struct TestApp {
        _root: TempDir,
        uploads: PathBuf,
        llm: Arc<ScriptedBackend>,
        router: Router,
    }

    fn app(llm: ScriptedBackend) -> TestApp {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        let templates = root.path().join("templates");
        std::fs::create_dir_all(&uploads).unwrap();
        std::fs::create_dir_all(&templates).unwrap();
        std::fs::write(
            templates.join("1.tex"),
            "\\documentclass{article}\n\\begin{document}\nNAME\n\\end{document}\n",
        )
        .unwrap();

        let llm = Arc::new(llm);
        let state = AppState {
            llm: llm.clone(),
            rasterizer: Arc::new(FakeRasterizer::with_pages(2)),
            converter: Arc::new(FakeConverter::new()),
            config: Config::for_tests(uploads.clone(), templates),
        };
        TestApp {
            _root: root,
            uploads,
            llm,
            router: build_router(state),
        }
    }

    fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn upload_dir_is_empty(dir: &PathBuf) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedBackend::new());
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_root_reports_ready() {
        let app = app(ScriptedBackend::new());
        let request = Request::get("/").body(Body::empty()).unwrap();

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["app"], "ResumeGPT");
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_connection_reflects_model_reachability() {
        let app_ok = app(ScriptedBackend::replying("Hello!"));
        let request = Request::get("/api/test-connection")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(app_ok.router, request).await;
        assert_eq!(body["connected"], true);

        let app_down = app(ScriptedBackend::failing(401, "Access denied"));
        let request = Request::get("/api/test-connection")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app_down.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connected"], false);
    }

    #[tokio::test]
    async fn test_upload_pdf_returns_extraction() {
        let app = app(ScriptedBackend::replying(JANE));
        let request = multipart_request("/api/upload", multipart_body("file", "cv.pdf", b"%PDF-1.7"));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filename"], "cv.pdf");
        assert_eq!(body["size"], 8);
        assert_eq!(body["extraction"]["status"], "success");
        assert_eq!(body["extraction"]["pages_processed"], 2);
        assert_eq!(body["extraction"]["method"], "vision");
        assert_eq!(
            body["extraction"]["structured_record"]["personal_info"]["name"],
            "Jane Doe"
        );
        assert!(upload_dir_is_empty(&app.uploads));
    }

    #[tokio::test]
    async fn test_upload_model_failure_is_reported_in_body() {
        let app = app(ScriptedBackend::replying("not json at all"));
        let request = multipart_request("/api/upload", multipart_body("file", "cv.pdf", b"%PDF"));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extraction"]["status"], "failure");
        assert_eq!(body["extraction"]["kind"], "parse");
        assert_eq!(body["extraction"]["raw_response_excerpt"], "not json at all");
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let app = app(ScriptedBackend::new());
        let request = multipart_request("/api/upload", multipart_body("file", "cv.pdf", b""));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["stage"], "received");
        assert!(app.llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let app = app(ScriptedBackend::new());
        let big = vec![b'a'; 11 * 1024 * 1024];
        let request = multipart_request("/api/upload", multipart_body("file", "cv.pdf", &big));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("File too large"));
        assert!(app.llm.calls().is_empty());
        assert!(upload_dir_is_empty(&app.uploads));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let app = app(ScriptedBackend::new());
        let request = multipart_request("/api/upload", multipart_body("file", "cv.exe", b"MZ"));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let app = app(ScriptedBackend::new());
        let request = multipart_request("/api/upload", multipart_body("resume", "cv.pdf", b"%PDF"));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Missing multipart field 'file'"));
    }

    #[tokio::test]
    async fn test_process_returns_latex_preview() {
        let llm = ScriptedBackend::new();
        llm.push_text(JANE);
        llm.push_text(
            "\\documentclass{article}\n\\begin{document}\nJane Doe\n\\end{document}",
        );
        let app = app(llm);
        let request = multipart_request("/api/process", multipart_body("file", "cv.pdf", b"%PDF"));

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pages_processed"], 2);
        assert!(body["latex_file"].as_str().unwrap().ends_with("cv.tex"));
        assert!(body["latex_preview"]
            .as_str()
            .unwrap()
            .contains("Jane Doe"));
        assert!(app.uploads.join("cv.tex").exists());
    }

    #[tokio::test]
    async fn test_process_unknown_template_is_not_found() {
        let app = app(ScriptedBackend::replying(JANE));
        let request = multipart_request(
            "/api/process?template_id=99",
            multipart_body("file", "cv.pdf", b"%PDF"),
        );

        let (status, body) = send(app.router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "TEMPLATE_NOT_FOUND");
        assert_eq!(body["error"]["stage"], "extracted");
        assert!(upload_dir_is_empty(&app.uploads));
    }
}

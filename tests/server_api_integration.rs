//! End-to-end tests for `POST /api/process-epub` through the real router,
//! with fake hyphenators injected in place of the external tool.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use server::{HyphenError, Hyphenator, ServerConfig, ServerResult, ServerState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

/// Fake tool: writes fixed bytes to the output path, like a well-behaved
/// hyphenator would.
struct WritingHyphenator {
    output: Vec<u8>,
}

#[async_trait]
impl Hyphenator for WritingHyphenator {
    async fn hyphenate(&self, _input: &Path, output: &Path, _language: &str) -> ServerResult<()> {
        tokio::fs::write(output, &self.output)
            .await
            .map_err(|e| HyphenError::Internal(e.to_string()))
    }
}

/// Fake tool: fails the way a real tool does on a malformed document.
struct FailingHyphenator {
    stderr: String,
}

#[async_trait]
impl Hyphenator for FailingHyphenator {
    async fn hyphenate(&self, _input: &Path, _output: &Path, _language: &str) -> ServerResult<()> {
        Err(HyphenError::Invocation(self.stderr.clone()))
    }
}

/// Fake tool: exits cleanly but never writes the output file.
struct SilentHyphenator;

#[async_trait]
impl Hyphenator for SilentHyphenator {
    async fn hyphenate(&self, _input: &Path, _output: &Path, _language: &str) -> ServerResult<()> {
        Ok(())
    }
}

fn test_router(scratch_dir: PathBuf, hyphenator: Arc<dyn Hyphenator>) -> Router {
    let config = ServerConfig {
        scratch_dir,
        ..Default::default()
    };
    let state = ServerState::with_hyphenator(config, hyphenator).expect("test state");
    server::build_router(Arc::new(state))
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a multipart/form-data body with optional `file` and `language`
/// fields, the way the browser form submits them.
fn multipart_body(file: Option<(&str, &[u8])>, language: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{name}\"\r\nContent-Type: application/epub+zip\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(code) = language {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{code}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn process_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/process-epub")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn scratch_entries(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[tokio::test]
async fn valid_upload_returns_hyphenated_attachment() {
    let dir = TempDir::new().unwrap();
    let transformed = b"hyphenated epub bytes".to_vec();
    let router = test_router(
        dir.path().to_path_buf(),
        Arc::new(WritingHyphenator {
            output: transformed.clone(),
        }),
    );

    let upload = vec![0x50u8; 1024]; // 1 KB source document
    let request = process_request(multipart_body(Some(("book.epub", &upload)), Some("en")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE.as_str()], "application/epub+zip");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION.as_str()],
        "attachment; filename=\"book-hyphenated.epub\""
    );
    assert_eq!(
        headers[header::CONTENT_LENGTH.as_str()],
        transformed.len().to_string().as_str()
    );
    assert_eq!(body_bytes(response).await, transformed);

    assert_eq!(scratch_entries(&dir), 0, "scratch dir must end empty");
}

#[tokio::test]
async fn tool_failure_maps_to_400_with_tool_detail() {
    let dir = TempDir::new().unwrap();
    let router = test_router(
        dir.path().to_path_buf(),
        Arc::new(FailingHyphenator {
            stderr: "corrupt archive".to_string(),
        }),
    );

    let request = process_request(multipart_body(Some(("book.epub", b"bytes")), Some("en")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json,
        serde_json::json!({
            "error": "EPUB hyphenation failed: corrupt archive",
            "success": false,
        })
    );

    assert_eq!(scratch_entries(&dir), 0, "staged input must be released");
}

#[tokio::test]
async fn wrong_file_type_is_rejected_without_touching_scratch() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let request = process_request(multipart_body(Some(("notes.txt", b"plain text")), Some("en")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid file type. Only EPUB files are allowed");
    assert_eq!(json["success"], false);

    assert_eq!(scratch_entries(&dir), 0);
}

#[tokio::test]
async fn missing_file_is_rejected_without_touching_scratch() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let request = process_request(multipart_body(None, Some("en")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file provided");
    assert_eq!(json["success"], false);

    assert_eq!(scratch_entries(&dir), 0);
}

#[tokio::test]
async fn unsupported_language_is_rejected() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let request = process_request(multipart_body(Some(("book.epub", b"bytes")), Some("de")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid language. Must be \"en\" or \"ru\"");

    assert_eq!(scratch_entries(&dir), 0);
}

#[tokio::test]
async fn oversize_upload_is_rejected_by_the_validator() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let oversize = vec![0u8; 50 * 1024 * 1024 + 1];
    let request = process_request(multipart_body(Some(("book.epub", &oversize)), Some("en")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File size must be less than 50MB");
    assert_eq!(json["success"], false);

    assert_eq!(scratch_entries(&dir), 0);
}

#[tokio::test]
async fn upload_past_the_body_limit_still_gets_the_size_rejection() {
    // Well past the framework body limit, so the multipart read itself fails
    // before the validator measures anything. The caller must see the same
    // 400 as a barely-oversize upload, not a transport-level error.
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let huge = vec![0u8; 55 * 1024 * 1024];
    let request = process_request(multipart_body(Some(("book.epub", &huge)), Some("en")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File size must be less than 50MB");
    assert_eq!(json["success"], false);

    assert_eq!(scratch_entries(&dir), 0);
}

#[tokio::test]
async fn tool_writing_no_output_is_a_server_fault() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let request = process_request(multipart_body(Some(("book.epub", b"bytes")), Some("ru")));
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("no readable output"));

    assert_eq!(scratch_entries(&dir), 0, "input must be released after the fault");
}

#[tokio::test]
async fn malformed_multipart_still_yields_json_error() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let request = Request::builder()
        .method("POST")
        .uri("/api/process-epub")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("not a form"))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn health_and_ready_probes_respond() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let health = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let json = body_json(health).await;
    assert_eq!(json["status"], "healthy");

    let ready = router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
    let json = body_json(ready).await;
    assert_eq!(json["components"]["scratch_dir"], "ready");
}

#[tokio::test]
async fn unknown_route_gets_json_404() {
    let dir = TempDir::new().unwrap();
    let router = test_router(dir.path().to_path_buf(), Arc::new(SilentHyphenator));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

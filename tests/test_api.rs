//! Integration tests for the HTTP API.
//!
//! The full router runs against the dummy completion provider and the
//! in-memory blob backend, so nothing here touches the network. The dummy
//! provider records the exact message list sent downstream, which is what
//! the context-injection assertions inspect.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use dokbot::blob::BlobStore;
use dokbot::blob::memory::MemoryBlobStore;
use dokbot::docs::{DocumentProcessor, DocumentStore};
use dokbot::llm::providers::dummy::DummyProvider;
use dokbot::llm::{CompletionProvider, SYSTEM_PROMPT};
use dokbot::server::{AppState, ServiceStatus, build_router};

// ── helpers ──────────────────────────────────────────────────────────────────

struct TestApp {
    router: Router,
    dummy: DummyProvider,
    docs: Arc<DocumentStore>,
    blobs: Arc<BlobStore>,
}

fn test_app() -> TestApp {
    let dummy = DummyProvider::new();
    let docs = Arc::new(DocumentStore::new());
    let blobs = Arc::new(BlobStore::Memory(MemoryBlobStore::new()));
    let state = AppState {
        processor: DocumentProcessor::new(docs.clone()),
        docs: docs.clone(),
        completion: CompletionProvider::Dummy(dummy.clone()),
        blobs: blobs.clone(),
        services: Arc::new(ServiceStatus::default()),
    };
    TestApp { router: build_router(state), dummy, docs, blobs }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("request handled");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    send(router, request).await
}

const BOUNDARY: &str = "dokbot-test-boundary";

fn multipart_request(
    field_name: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/documents/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ── upload ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_plain_text_returns_descriptor() {
    let app = test_app();
    let request = multipart_request("file", "notes.txt", "text/plain", b"Hello world");
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let doc = &body["document"];
    assert_eq!(doc["filename"], "notes.txt");
    assert_eq!(doc["contentLength"], 11);
    assert_eq!(doc["sampleContent"], "Hello world");

    let id = doc["id"].as_str().unwrap();
    assert!(id.ends_with("-notes.txt"));
    assert_eq!(app.docs.get(id).unwrap().as_deref(), Some("Hello world"));
    assert_eq!(app.docs.list_all().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = test_app();
    let request = multipart_request("attachment", "notes.txt", "text/plain", b"Hello");
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("no file uploaded"));
}

#[tokio::test]
async fn upload_corrupt_pdf_is_a_processing_error() {
    let app = test_app();
    let request = multipart_request("file", "broken.pdf", "application/pdf", b"not a pdf");
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("pdf extraction failed"));
}

#[tokio::test]
async fn upload_ids_differ_for_distinct_filenames() {
    let app = test_app();
    // Back-to-back requests usually share a millisecond; the filename
    // suffix must keep the ids apart.
    let (_, a) = send(&app.router, multipart_request("file", "a.txt", "text/plain", b"x")).await;
    let (_, b) = send(&app.router, multipart_request("file", "b.txt", "text/plain", b"x")).await;
    assert_ne!(a["document"]["id"], b["document"]["id"]);
    assert_eq!(app.docs.list_all().unwrap().len(), 2);
}

// ── chat ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_sends_system_plus_history_downstream() {
    let app = test_app();
    let (status, body) = post_json(
        &app.router,
        "/api/chat",
        json!({ "messages": [{ "role": "user", "content": "Hi" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["role"], "assistant");
    assert_eq!(body["message"]["content"], "[echo] Hi");

    let sent = app.dummy.last_request().expect("request recorded");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].role, "system");
    assert_eq!(sent[0].content, SYSTEM_PROMPT);
    assert_eq!(sent[1].content, "Hi");
}

#[tokio::test]
async fn chat_stream_injects_stored_document_text() {
    let app = test_app();
    app.docs.add("1700000000000-notes.txt", "Hemmelig innhold").unwrap();

    let (status, _) = post_json(
        &app.router,
        "/api/chat/stream",
        json!({
            "messages": [{ "role": "user", "content": "Hva står det i dokumentet?" }],
            "documentId": "1700000000000-notes.txt",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sent = app.dummy.last_request().unwrap();
    assert_eq!(sent[0].role, "system");
    assert!(sent[0].content.contains("Hemmelig innhold"));
    assert!(sent[0].content.contains("Dokumentkontekst:"));
}

#[tokio::test]
async fn chat_stream_with_unknown_document_proceeds_without_context() {
    let app = test_app();
    let (status, body) = post_json(
        &app.router,
        "/api/chat/stream",
        json!({
            "messages": [{ "role": "user", "content": "Hi" }],
            "documentId": "does-not-exist",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["content"], "[echo] Hi");

    let sent = app.dummy.last_request().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].content, SYSTEM_PROMPT);
}

#[tokio::test]
async fn chat_stream_without_document_id_is_plain_chat() {
    let app = test_app();
    let (status, _) = post_json(
        &app.router,
        "/api/chat/stream",
        json!({ "messages": [{ "role": "user", "content": "Hi" }] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.dummy.last_request().unwrap().len(), 2);
}

#[tokio::test]
async fn chat_rejects_wrong_method() {
    let app = test_app();
    let (status, _) = get(&app.router, "/api/chat").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn chat_test_probes_the_provider() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/chat/test").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"]["content"],
        "[echo] Si hei og fortell meg hvilken modell du bruker."
    );
}

// ── documents ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_documents_on_empty_backend_is_empty_array() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/documents/list").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "documents": [] }));
}

#[tokio::test]
async fn list_documents_reports_blobs_as_indexed() {
    let app = test_app();
    app.blobs.put("report.pdf", b"%PDF", "application/pdf").await.unwrap();

    let (status, body) = get(&app.router, "/api/documents/list").await;
    assert_eq!(status, StatusCode::OK);

    let docs = body["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0]["name"].as_str().unwrap().ends_with("-report.pdf"));
    assert_eq!(docs[0]["size"], 4);
    assert_eq!(docs[0]["indexed"], true);
}

#[tokio::test]
async fn dump_documents_previews_store_contents() {
    let app = test_app();
    let long = "a".repeat(150);
    app.docs.add("1-long.txt", &long).unwrap();

    let (status, body) = get(&app.router, "/api/documents/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documentCount"], 1);

    let doc = &body["documents"][0];
    assert_eq!(doc["id"], "1-long.txt");
    assert_eq!(doc["contentLength"], 150);
    assert_eq!(doc["preview"].as_str().unwrap().len(), 100);
}

// ── diagnostics & ui ─────────────────────────────────────────────────────────

#[tokio::test]
async fn services_reports_missing_credentials() {
    let app = test_app();
    let (status, body) = get(&app.router, "/api/services").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["openai"]["key"], "Missing");
    assert_eq!(body["storage"]["sasToken"], "Missing");
    assert_eq!(body["search"]["key"], "Missing");
}

#[tokio::test]
async fn root_serves_status_page() {
    let app = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Dokbot"));
}

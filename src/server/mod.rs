//! HTTP server — axum router and shared application state.
//!
//! `run()` drives the axum event loop; a [`CancellationToken`] is wired to
//! axum's graceful shutdown so Ctrl-C drains in-flight requests.
//!
//! ## URL layout
//!
//! ```text
//! POST /api/chat             — completion over the supplied history
//! POST /api/chat/stream      — same, plus optional documentId context
//! GET  /api/chat/test        — canned probe against the live provider
//! POST /api/documents/upload — multipart ingestion
//! GET  /api/documents/list   — blob listing
//! GET  /api/documents/test   — diagnostic dump of the in-memory store
//! GET  /api/services         — config-presence diagnostics
//! GET  /favicon.ico          → 204
//! GET  /                     → status page
//! ```

pub mod api;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::blob::BlobStore;
use crate::config::Config;
use crate::docs::{DocumentProcessor, DocumentStore};
use crate::error::AppError;
use crate::llm::CompletionProvider;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — all fields are reference-counted. The document store is
/// constructed exactly once, at startup, and every handler sees the same
/// instance for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub docs: Arc<DocumentStore>,
    pub processor: DocumentProcessor,
    pub completion: CompletionProvider,
    pub blobs: Arc<BlobStore>,
    pub services: Arc<ServiceStatus>,
}

/// Configuration-presence snapshot reported by `GET /api/services`.
///
/// Holds no secrets — only whether each credential was supplied.
#[derive(Debug, Default)]
pub struct ServiceStatus {
    pub storage_endpoint: Option<String>,
    pub storage_sas_set: bool,
    pub search_endpoint: Option<String>,
    pub search_key_set: bool,
    pub openai_endpoint: Option<String>,
    pub openai_deployment: String,
    pub openai_key_set: bool,
}

impl ServiceStatus {
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage_endpoint: non_empty(&config.blob.endpoint),
            storage_sas_set: config.storage_sas.is_some(),
            search_endpoint: config.search_endpoint.clone(),
            search_key_set: config.search_key.is_some(),
            openai_endpoint: non_empty(&config.llm.azure.endpoint),
            openai_deployment: config.llm.azure.deployment.clone(),
            openai_key_set: config.openai_api_key.is_some(),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Assemble the application state around a fresh document store.
pub fn build_state(config: &Config, completion: CompletionProvider, blobs: BlobStore) -> AppState {
    let docs = Arc::new(DocumentStore::new());
    AppState {
        processor: DocumentProcessor::new(docs.clone()),
        docs,
        completion,
        blobs: Arc::new(blobs),
        services: Arc::new(ServiceStatus::from_config(config)),
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(api::chat))
        .route("/api/chat/stream", post(api::chat_stream))
        .route("/api/chat/test", get(api::chat_test))
        .route("/api/documents/upload", post(api::upload))
        .route("/api/documents/list", get(api::list_documents))
        .route("/api/documents/test", get(api::dump_documents))
        .route("/api/services", get(api::services))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/", get(ui::root))
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

pub async fn run(bind_addr: &str, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(AppError::Io)?;

    info!("http server shut down");
    Ok(())
}

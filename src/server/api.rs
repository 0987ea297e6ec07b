//! Handlers for the `/api/*` routes.
//!
//! Every handler-level failure is reported the same way: HTTP 500 with
//! `{"error": "<message>"}` carrying the raw error text. Method mismatches
//! fall out of the router as 405.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::docs::UploadedFile;
use crate::error::AppError;
use crate::llm::ChatMessage;

use super::AppState;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
pub(super) struct ChatStreamRequest {
    messages: Vec<ChatMessage>,
    #[serde(rename = "documentId")]
    document_id: Option<String>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build the uniform 500 response body.
fn internal_error(e: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("{e}") })),
    )
        .into_response()
}

// ── Chat ──────────────────────────────────────────────────────────────────────

/// POST /api/chat — completion over the supplied history.
pub(super) async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    match state.completion.complete(&req.messages, None).await {
        Ok(message) => (StatusCode::OK, Json(json!({ "message": message }))).into_response(),
        Err(e) => {
            warn!("chat completion failed: {e}");
            internal_error(e)
        }
    }
}

/// POST /api/chat/stream — completion with optional document context.
/// The route name is historical; the response is a single JSON body.
pub(super) async fn chat_stream(
    State(state): State<AppState>,
    Json(req): Json<ChatStreamRequest>,
) -> Response {
    let context = match resolve_context(&state, req.document_id.as_deref()) {
        Ok(context) => context,
        Err(e) => {
            warn!("document lookup failed: {e}");
            return internal_error(e);
        }
    };

    match state.completion.complete(&req.messages, context.as_deref()).await {
        Ok(message) => (StatusCode::OK, Json(json!({ "message": message }))).into_response(),
        Err(e) => {
            warn!("chat completion failed: {e}");
            internal_error(e)
        }
    }
}

/// Look up the referenced document, if any. An unknown id is not an error:
/// the chat proceeds without context.
fn resolve_context(state: &AppState, document_id: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(id) = document_id else {
        return Ok(None);
    };
    let content = state.docs.get(id)?;
    match &content {
        Some(text) => debug!(%id, content_len = text.len(), "document context attached"),
        None => debug!(%id, "document not found, proceeding without context"),
    }
    Ok(content)
}

/// GET /api/chat/test — sends a canned probe message to the live provider.
pub(super) async fn chat_test(State(state): State<AppState>) -> Response {
    let probe = vec![ChatMessage::new(
        "user",
        "Si hei og fortell meg hvilken modell du bruker.",
    )];
    let config = json!({
        "endpoint": state.services.openai_endpoint,
        "deployment": state.services.openai_deployment,
    });
    match state.completion.complete(&probe, None).await {
        Ok(message) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": message, "config": config })),
        )
            .into_response(),
        Err(e) => {
            warn!("completion probe failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": format!("{e}"), "config": config })),
            )
                .into_response()
        }
    }
}

// ── Documents ─────────────────────────────────────────────────────────────────

/// POST /api/documents/upload — single multipart `file` field.
pub(super) async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    let file = match read_file_field(multipart).await {
        Ok(file) => file,
        Err(e) => {
            warn!("upload rejected: {e}");
            return internal_error(e);
        }
    };

    match state.processor.process(file) {
        Ok(descriptor) => {
            (StatusCode::OK, Json(json!({ "document": descriptor }))).into_response()
        }
        Err(e) => {
            warn!("document processing failed: {e}");
            internal_error(e)
        }
    }
}

/// Pull the first `file` field out of the multipart body, fully buffered.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart read error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload body: {e}")))?;
        return Ok(UploadedFile { filename, content_type, bytes: bytes.to_vec() });
    }
    Err(AppError::Validation("no file uploaded".into()))
}

/// GET /api/documents/list — blob listing. `indexed` is reported true
/// unconditionally; there is no indexing pipeline behind it.
pub(super) async fn list_documents(State(state): State<AppState>) -> Response {
    match state.blobs.list().await {
        Ok(blobs) => {
            let documents: Vec<_> = blobs
                .into_iter()
                .map(|b| {
                    json!({
                        "name": b.name,
                        "size": b.size,
                        "uploaded": b.uploaded,
                        "indexed": true,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "documents": documents }))).into_response()
        }
        Err(e) => {
            warn!("blob listing failed: {e}");
            internal_error(e)
        }
    }
}

/// GET /api/documents/test — diagnostic dump of the in-memory store, with
/// first-100-character previews.
pub(super) async fn dump_documents(State(state): State<AppState>) -> Response {
    match state.docs.list_all() {
        Ok(entries) => {
            let documents: Vec<_> = entries
                .iter()
                .map(|(id, content)| {
                    json!({
                        "id": id,
                        "contentLength": content.chars().count(),
                        "preview": content.chars().take(100).collect::<String>(),
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "documentCount": documents.len(), "documents": documents })),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// GET /api/services — "Set"/"Missing" per configured external service.
pub(super) async fn services(State(state): State<AppState>) -> Response {
    let s = &state.services;
    let set_or_missing = |set: bool| if set { "Set" } else { "Missing" };
    let body = json!({
        "storage": {
            "endpoint": s.storage_endpoint,
            "sasToken": set_or_missing(s.storage_sas_set),
        },
        "search": {
            "endpoint": s.search_endpoint,
            "key": set_or_missing(s.search_key_set),
        },
        "openai": {
            "endpoint": s.openai_endpoint,
            "deployment": s.openai_deployment,
            "key": set_or_missing(s.openai_key_set),
        },
    });
    (StatusCode::OK, Json(body)).into_response()
}

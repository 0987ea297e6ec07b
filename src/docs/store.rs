//! In-memory document store — process-wide id → extracted-text map.
//!
//! One instance is constructed at startup and shared behind an `Arc`; all
//! ingestion and all lookups observe the same map. Entries accumulate for
//! the life of the process: no TTL, no size cap, no delete in the request
//! path (`clear` exists for tests and resets only).
//!
//! `add` is an unconditional overwrite-by-key. Ids embed an ingestion
//! timestamp and filename, so same-key writes are rare but possible; the
//! last writer wins.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::AppError;

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Mutex<HashMap<String, String>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `content` under `id`, overwriting any existing entry.
    pub fn add(&self, id: &str, content: &str) -> Result<String, AppError> {
        let mut documents = self.lock()?;
        documents.insert(id.to_string(), content.to_string());
        debug!(%id, content_len = content.len(), total = documents.len(), "document added");
        Ok(id.to_string())
    }

    /// Exact-key lookup; `None` when the id is unknown.
    pub fn get(&self, id: &str) -> Result<Option<String>, AppError> {
        let documents = self.lock()?;
        let content = documents.get(id).cloned();
        debug!(%id, found = content.is_some(), "document lookup");
        Ok(content)
    }

    /// All `(id, content)` pairs currently held, in arbitrary order.
    pub fn list_all(&self) -> Result<Vec<(String, String)>, AppError> {
        let documents = self.lock()?;
        Ok(documents.iter().map(|(id, c)| (id.clone(), c.clone())).collect())
    }

    /// Drop every entry. Not reachable from the request path.
    pub fn clear(&self) -> Result<(), AppError> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.documents
            .lock()
            .map_err(|_| AppError::Store("document store lock poisoned".into()))
    }
}

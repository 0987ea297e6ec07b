//! In-memory blob backend — default for local runs, test double for the
//! listing endpoint. Holds metadata only; blob bodies are not retained.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::AppError;

use super::BlobInfo;

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<Vec<BlobInfo>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Result<Vec<BlobInfo>, AppError> {
        Ok(self.lock()?.clone())
    }

    pub fn put(&self, filename: &str, bytes: &[u8]) -> Result<String, AppError> {
        let name = format!("{}-{}", Uuid::new_v4(), filename);
        let info = BlobInfo {
            name: name.clone(),
            size: bytes.len() as u64,
            uploaded: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        self.lock()?.push(info);
        Ok(name)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<BlobInfo>>, AppError> {
        self.blobs
            .lock()
            .map_err(|_| AppError::Blob("memory blob store lock poisoned".into()))
    }
}

//! Blob storage interface.
//!
//! `BlobStore` is an enum over concrete backends, mirroring the completion
//! provider abstraction: adding a backend = new module + new variant + new
//! match arms. The `memory` backend is the default for local runs and
//! doubles as the test fake; the `azure` backend speaks the Blob service
//! REST API.

pub mod azure;
pub mod memory;

use serde::Serialize;

use crate::config::BlobConfig;
use crate::error::AppError;

/// A stored blob as reported by `list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobInfo {
    pub name: String,
    pub size: u64,
    /// Creation timestamp as reported by the backend.
    pub uploaded: String,
}

#[derive(Debug, Clone)]
pub enum BlobStore {
    Memory(memory::MemoryBlobStore),
    Azure(azure::AzureBlobStore),
}

impl BlobStore {
    /// Every blob in the container.
    pub async fn list(&self) -> Result<Vec<BlobInfo>, AppError> {
        match self {
            BlobStore::Memory(s) => s.list(),
            BlobStore::Azure(s) => s.list().await,
        }
    }

    /// Store `bytes` under a uuid-prefixed blob name; returns the name.
    pub async fn put(
        &self,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        match self {
            BlobStore::Memory(s) => s.put(filename, bytes),
            BlobStore::Azure(s) => s.put(filename, bytes, content_type).await,
        }
    }
}

/// Construct a `BlobStore` from config. `sas_token` comes from
/// `AZURE_STORAGE_SAS` env — never TOML.
pub fn build(config: &BlobConfig, sas_token: Option<String>) -> Result<BlobStore, AppError> {
    match config.backend.as_str() {
        "memory" => Ok(BlobStore::Memory(memory::MemoryBlobStore::new())),
        "azure" => Ok(BlobStore::Azure(azure::AzureBlobStore::new(config, sas_token)?)),
        other => Err(AppError::Config(format!("unknown blob backend: {other}"))),
    }
}

//! Document ingestion and storage.

pub mod processor;
pub mod store;

pub use processor::{DocumentDescriptor, DocumentProcessor, UploadedFile};
pub use store::DocumentStore;

//! Document ingestion — text extraction and registration in the store.
//!
//! PDF uploads go through `pdf-extract`; anything else is decoded as UTF-8
//! with replacement characters, so binary junk declared as text comes out
//! garbled rather than rejected. The freshly written entry is read back
//! before the descriptor is returned; a miss there means the store itself
//! misbehaved and surfaces as `StorageVerification`.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::docs::store::DocumentStore;
use crate::error::AppError;

/// MIME type that routes an upload through PDF extraction.
pub const PDF_MIME: &str = "application/pdf";

/// Number of characters included in `sample_content`.
const SAMPLE_LEN: usize = 100;

/// An uploaded file, fully read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Declared MIME type from the multipart field, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Summary record returned after ingestion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    pub id: String,
    pub filename: String,
    pub content_length: usize,
    pub sample_content: String,
}

/// Turns uploads into store entries. Stateless apart from the store handle;
/// cheap to clone.
#[derive(Clone)]
pub struct DocumentProcessor {
    store: Arc<DocumentStore>,
}

impl DocumentProcessor {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Extract text from `file`, register it under a fresh id, and return
    /// its descriptor.
    ///
    /// The id is `<unix-millis>-<filename>`; two same-millisecond uploads
    /// of identically named files collide, an accepted edge case.
    pub fn process(&self, file: UploadedFile) -> Result<DocumentDescriptor, AppError> {
        debug!(
            filename = %file.filename,
            content_type = ?file.content_type,
            size = file.bytes.len(),
            "processing upload"
        );

        let text = extract_text(&file)?;

        let id = format!("{}-{}", Utc::now().timestamp_millis(), file.filename);
        self.store.add(&id, &text)?;

        // Read back the entry we just wrote; a miss here is a store bug.
        if self.store.get(&id)?.is_none() {
            return Err(AppError::StorageVerification(format!(
                "document {id} missing after write"
            )));
        }

        let content_length = text.chars().count();
        info!(%id, content_length, "document stored");

        Ok(DocumentDescriptor {
            sample_content: text.chars().take(SAMPLE_LEN).collect(),
            content_length,
            filename: file.filename,
            id,
        })
    }
}

/// Extract plain text according to the declared MIME type.
fn extract_text(file: &UploadedFile) -> Result<String, AppError> {
    if file.content_type.as_deref() == Some(PDF_MIME) {
        pdf_extract::extract_text_from_mem(&file.bytes).map_err(|e| {
            AppError::Processing(format!("pdf extraction failed for {}: {e}", file.filename))
        })
    } else {
        Ok(String::from_utf8_lossy(&file.bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> (DocumentProcessor, Arc<DocumentStore>) {
        let store = Arc::new(DocumentStore::new());
        (DocumentProcessor::new(store.clone()), store)
    }

    fn text_file(name: &str, content: &str) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: content.as_bytes().to_vec(),
        }
    }

    #[test]
    fn plain_text_descriptor_and_store_agree() {
        let (processor, store) = processor();
        let descriptor = processor.process(text_file("notes.txt", "Hello world")).unwrap();

        assert_eq!(descriptor.filename, "notes.txt");
        assert_eq!(descriptor.content_length, 11);
        assert_eq!(descriptor.sample_content, "Hello world");
        assert!(descriptor.id.ends_with("-notes.txt"));

        assert_eq!(
            store.get(&descriptor.id).unwrap().as_deref(),
            Some("Hello world")
        );
    }

    #[test]
    fn id_embeds_millis_timestamp() {
        let (processor, _) = processor();
        let descriptor = processor.process(text_file("a.txt", "x")).unwrap();
        let (millis, rest) = descriptor.id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest, "a.txt");
    }

    #[test]
    fn ids_differ_for_distinct_filenames_in_same_millisecond() {
        let (processor, _) = processor();
        // Back-to-back uploads typically land in the same millisecond; the
        // filename suffix must still keep the ids apart.
        let a = processor.process(text_file("a.txt", "x")).unwrap();
        let b = processor.process(text_file("b.txt", "x")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_file_yields_zero_length_content() {
        let (processor, store) = processor();
        let descriptor = processor.process(text_file("empty.txt", "")).unwrap();
        assert_eq!(descriptor.content_length, 0);
        assert_eq!(descriptor.sample_content, "");
        assert_eq!(store.get(&descriptor.id).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn sample_content_is_capped_at_100_chars() {
        let (processor, _) = processor();
        let long = "x".repeat(250);
        let descriptor = processor.process(text_file("long.txt", &long)).unwrap();
        assert_eq!(descriptor.content_length, 250);
        assert_eq!(descriptor.sample_content.chars().count(), 100);
    }

    #[test]
    fn non_utf8_text_decodes_lossily() {
        let (processor, _) = processor();
        let file = UploadedFile {
            filename: "binary.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: vec![0xff, 0xfe, b'h', b'i'],
        };
        let descriptor = processor.process(file).unwrap();
        // Invalid bytes become replacement characters; the upload succeeds.
        assert!(descriptor.sample_content.contains('\u{FFFD}'));
        assert!(descriptor.sample_content.ends_with("hi"));
    }

    #[test]
    fn corrupt_pdf_is_a_processing_error() {
        let (processor, _) = processor();
        let file = UploadedFile {
            filename: "broken.pdf".to_string(),
            content_type: Some(PDF_MIME.to_string()),
            bytes: b"this is not a pdf".to_vec(),
        };
        let err = processor.process(file).unwrap_err();
        assert!(matches!(err, AppError::Processing(_)));
        assert!(err.to_string().contains("broken.pdf"));
    }

    #[test]
    fn descriptor_serializes_camel_case() {
        let descriptor = DocumentDescriptor {
            id: "1-x.txt".into(),
            filename: "x.txt".into(),
            content_length: 2,
            sample_content: "hi".into(),
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["contentLength"], 2);
        assert_eq!(json["sampleContent"], "hi");
    }
}

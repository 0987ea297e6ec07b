//! Azure Blob Storage adapter (SAS-token auth).
//!
//! Speaks the Blob service REST API directly: `List Blobs` backs the
//! listing endpoint, `Put Blob` backs uploads. The SAS token is appended
//! as query parameters on every request — no shared-key signing. Wire
//! details (the listing XML) stay private to this module.

use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::Client;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::BlobConfig;
use crate::error::AppError;

use super::BlobInfo;

#[derive(Debug, Clone)]
pub struct AzureBlobStore {
    client: Client,
    endpoint: String,
    container: String,
    sas_token: String,
}

impl AzureBlobStore {
    /// Fails when the endpoint or SAS token is absent — credentials are
    /// checked at construction, not on first use.
    pub fn new(config: &BlobConfig, sas_token: Option<String>) -> Result<Self, AppError> {
        if config.endpoint.is_empty() {
            return Err(AppError::Config("blob endpoint is not set".into()));
        }
        let sas_token =
            sas_token.ok_or_else(|| AppError::Config("AZURE_STORAGE_SAS is not set".into()))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Blob(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            container: config.container.clone(),
            sas_token: sas_token.trim_start_matches('?').to_string(),
        })
    }

    /// `List Blobs` over the whole container (flat listing).
    pub async fn list(&self) -> Result<Vec<BlobInfo>, AppError> {
        let url = format!(
            "{}/{}?restype=container&comp=list&{}",
            self.endpoint, self.container, self.sas_token
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Blob(format!("list blobs request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, "blob listing returned HTTP error");
            return Err(AppError::Blob(format!("list blobs returned HTTP {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Blob(format!("failed to read listing body: {e}")))?;

        let blobs = parse_blob_list(&body)?;
        debug!(count = blobs.len(), container = %self.container, "listed blobs");
        Ok(blobs)
    }

    /// `Put Blob` under a uuid-prefixed name; returns the blob name.
    pub async fn put(
        &self,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, AppError> {
        let name = format!("{}-{}", Uuid::new_v4(), filename);
        let url = format!("{}/{}/{}?{}", self.endpoint, self.container, name, self.sas_token);

        let response = self
            .client
            .put(&url)
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| AppError::Blob(format!("put blob request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Blob(format!("put blob returned HTTP {status}: {body}")));
        }

        debug!(%name, size = bytes.len(), "blob uploaded");
        Ok(name)
    }
}

// ── Listing XML ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct PartialBlob {
    name: String,
    size: u64,
    created: String,
}

/// Parse the `List Blobs` response body into `BlobInfo` records.
///
/// The shape is `<EnumerationResults><Blobs><Blob><Name>…</Name>
/// <Properties><Creation-Time>…</Creation-Time>
/// <Content-Length>…</Content-Length></Properties></Blob>…`.
fn parse_blob_list(xml: &str) -> Result<Vec<BlobInfo>, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut blobs = Vec::new();
    let mut current: Option<PartialBlob> = None;
    let mut tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if tag == "Blob" {
                    current = Some(PartialBlob::default());
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(blob) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| AppError::Blob(format!("malformed listing XML: {e}")))?;
                    match tag.as_str() {
                        "Name" => blob.name = text.into_owned(),
                        "Content-Length" => blob.size = text.parse().unwrap_or(0),
                        "Creation-Time" => blob.created = text.into_owned(),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                tag.clear();
                if e.name().as_ref() == b"Blob" {
                    if let Some(blob) = current.take() {
                        blobs.push(BlobInfo {
                            name: blob.name,
                            size: blob.size,
                            uploaded: blob.created,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AppError::Blob(format!("malformed listing XML: {e}"))),
            _ => {}
        }
    }

    Ok(blobs)
}

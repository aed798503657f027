//! Document upload with local size and extension checks.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::api::{Backend, UploadRequest};
use crate::config::UploadConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{Document, DocumentType};

/// Uploads documents and tracks their indexing status.
///
/// This component never waits for indexing to finish; callers decide whether
/// to call [`DocumentIntake::refresh`] until the document is ready.
#[derive(Clone)]
pub struct DocumentIntake {
    backend: Arc<dyn Backend>,
    limits: UploadConfig,
}

impl DocumentIntake {
    pub fn new(backend: Arc<dyn Backend>, limits: UploadConfig) -> Self {
        Self { backend, limits }
    }

    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        document_type: DocumentType,
    ) -> ClientResult<Document> {
        self.check_upload(filename, &bytes)?;

        let mime_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        debug!(
            "Uploading {} '{}' ({} bytes, {})",
            document_type,
            filename,
            bytes.len(),
            mime_type
        );

        let response = self
            .backend
            .upload(UploadRequest {
                filename: filename.to_string(),
                document_type,
                mime_type,
                bytes,
            })
            .await?;
        if response.document_id.trim().is_empty() {
            return Err(ClientError::Protocol {
                endpoint: "documents/upload",
                reason: "empty document id".to_string(),
            });
        }

        info!(
            "Uploaded '{}' as document {} ({:?}, {}% indexed)",
            filename,
            response.document_id,
            response.status,
            response.processing_details.percent()
        );
        Ok(Document {
            id: response.document_id,
            filename: filename.to_string(),
            document_type,
            processing: response.processing_details,
        })
    }

    /// Updates the processing status of `document`.
    ///
    /// Documents whose indexing reached a terminal state are left untouched
    /// and no request is made.
    pub async fn refresh(&self, document: &mut Document) -> ClientResult<()> {
        if document.processing.is_terminal() {
            return Ok(());
        }
        let response = self.backend.document_status(&document.id).await?;
        if response.document_id != document.id {
            return Err(ClientError::Protocol {
                endpoint: "documents/status",
                reason: format!(
                    "requested '{}', received '{}'",
                    document.id, response.document_id
                ),
            });
        }
        document.processing = response.processing_details;
        debug!(
            "Document {}: {}/{} chunks, indexing {:?}",
            document.id,
            document.processing.chunks_processed,
            document.processing.chunks_total,
            document.processing.indexing_status
        );
        Ok(())
    }

    fn check_upload(&self, filename: &str, bytes: &[u8]) -> ClientResult<()> {
        if filename.trim().is_empty() {
            return Err(ClientError::validation("Filename must not be empty"));
        }
        if bytes.is_empty() {
            return Err(ClientError::validation(format!("'{}' is empty", filename)));
        }
        if bytes.len() as u64 > self.limits.max_bytes {
            return Err(ClientError::validation(format!(
                "'{}' is {} bytes, limit is {}",
                filename,
                bytes.len(),
                self.limits.max_bytes
            )));
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let allowed = self
            .limits
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension));
        if !allowed {
            return Err(ClientError::validation(format!(
                "'{}' has unsupported extension (allowed: {})",
                filename,
                self.limits.allowed_extensions.join(", ")
            )));
        }
        Ok(())
    }
}

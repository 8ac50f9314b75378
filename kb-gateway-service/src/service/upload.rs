//! Document upload relay.

use bytes::Bytes;
use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::service::{DocumentReference, GatewayService};

/// A document ready to be relayed, whatever form it arrived in
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub content: Bytes,
    pub filename: String,
}

impl UploadPayload {
    /// Build a payload, rejecting empty content.
    ///
    /// A missing or blank filename is replaced by a generated one.
    pub fn new(content: Bytes, filename: Option<String>) -> ServiceResult<Self> {
        if content.is_empty() {
            return Err(ServiceError::MissingInput);
        }

        let filename = filename
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(default_filename);

        Ok(Self { content, filename })
    }
}

/// Name given to documents that arrive without one
pub fn default_filename() -> String {
    format!("document-{}.bin", uuid::Uuid::new_v4())
}

impl GatewayService {
    /// Relay a document to the platform and return the refreshed listing.
    ///
    /// Storing the file and attaching it to the vector store must both
    /// succeed. Linking the vector store to the assistant is attempted
    /// afterwards; its failure is logged and the upload still succeeds.
    pub async fn upload_document(
        &self,
        payload: UploadPayload,
    ) -> ServiceResult<Vec<DocumentReference>> {
        let UploadPayload { content, filename } = payload;
        let size = content.len();
        info!(filename = %filename, size, "Uploading document");

        let file = self.knowledge_base.upload_file(content, &filename).await?;
        self.knowledge_base.attach_file(&file.id).await?;

        info!(
            file_id = %file.id,
            filename = %filename,
            vector_store_id = %self.runtime_config.platform.vector_store_id,
            "Document stored and attached to vector store"
        );

        match self.knowledge_base.link_assistant().await {
            Ok(()) => info!(
                assistant_id = %self.runtime_config.platform.assistant_id,
                "Vector store linked to assistant"
            ),
            Err(e) => warn!(
                assistant_id = %self.runtime_config.platform.assistant_id,
                file_id = %file.id,
                error = %e,
                "Could not link vector store to assistant"
            ),
        }

        self.list_documents().await
    }
}

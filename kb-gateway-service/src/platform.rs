//! Boundary between the gateway and the hosted knowledge base.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::PlatformError;

/// A file as stored by the platform's file store
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    pub filename: String,
    /// Unix timestamp in seconds
    pub created_at: i64,
}

/// A file attached to the vector store. Only the id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreFile {
    pub id: String,
}

/// Operations the gateway needs from the hosted platform.
///
/// Every call targets the single vector store and assistant the
/// implementation was configured with.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Lightweight read against the vector store listing. Never fails.
    async fn probe(&self) -> bool;

    /// Files currently attached to the vector store, in platform order
    async fn list_attached(&self) -> Result<Vec<VectorStoreFile>, PlatformError>;

    /// Metadata for one file
    async fn retrieve_file(&self, file_id: &str) -> Result<FileObject, PlatformError>;

    /// Store a new file for assistant use
    async fn upload_file(&self, content: Bytes, filename: &str)
    -> Result<FileObject, PlatformError>;

    /// Attach a stored file to the vector store
    async fn attach_file(&self, file_id: &str) -> Result<(), PlatformError>;

    /// Grant the assistant file search over the vector store
    async fn link_assistant(&self) -> Result<(), PlatformError>;

    /// Detach a file from the vector store.
    ///
    /// Returns the HTTP status; only transport failures are errors.
    async fn detach_file(&self, file_id: &str) -> Result<u16, PlatformError>;

    /// Delete a file from the file store.
    ///
    /// Returns the HTTP status; only transport failures are errors.
    async fn delete_file(&self, file_id: &str) -> Result<u16, PlatformError>;
}

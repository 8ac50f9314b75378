//! Vector store listing with per-file metadata resolution.

use chrono::DateTime;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{PlatformError, ServiceError, ServiceResult};
use crate::platform::FileObject;
use crate::service::{DocumentReference, GatewayService};

/// Placeholder for metadata that could not be resolved
pub const UNKNOWN: &str = "Unknown";

/// Render a platform Unix timestamp for display
fn format_created_at(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn to_reference(file_id: &str, lookup: Result<FileObject, PlatformError>) -> DocumentReference {
    match lookup {
        Ok(file) => DocumentReference {
            id: file.id,
            name: file.filename,
            created_at: format_created_at(file.created_at),
        },
        Err(e) => {
            warn!(file_id = %file_id, error = %e, "Could not resolve file metadata");
            DocumentReference {
                id: file_id.to_string(),
                name: UNKNOWN.to_string(),
                created_at: UNKNOWN.to_string(),
            }
        }
    }
}

impl GatewayService {
    /// List the documents attached to the vector store.
    ///
    /// Metadata lookups run concurrently. A failed lookup yields an entry
    /// with [`UNKNOWN`] name and timestamp; only a failed initial listing
    /// fails the call. Order follows the platform's listing.
    pub async fn list_documents(&self) -> ServiceResult<Vec<DocumentReference>> {
        debug!("Fetching vector store files");

        let attached = self
            .knowledge_base
            .list_attached()
            .await
            .map_err(ServiceError::ListUnavailable)?;

        info!(count = attached.len(), "Vector store files found");

        let lookups = attached
            .iter()
            .map(|file| self.knowledge_base.retrieve_file(&file.id));
        let results = join_all(lookups).await;

        Ok(attached
            .iter()
            .zip(results)
            .map(|(file, lookup)| to_reference(&file.id, lookup))
            .collect())
    }
}

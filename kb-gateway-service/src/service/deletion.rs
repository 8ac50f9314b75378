//! Best-effort document deletion.

use tracing::{info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::service::{DocumentReference, GatewayService};

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Platform file ids are a single opaque token such as `file-abc123`.
fn is_valid_file_id(file_id: &str) -> bool {
    !file_id.is_empty()
        && file_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl GatewayService {
    /// Detach a document from the vector store, delete it from the file
    /// store, and return the refreshed listing.
    ///
    /// Both removals are always attempted. Error statuses are logged and
    /// otherwise ignored; only transport failures abort. An id that is not
    /// a plain platform token is rejected before any platform call.
    pub async fn delete_document(&self, file_id: &str) -> ServiceResult<Vec<DocumentReference>> {
        if !is_valid_file_id(file_id) {
            warn!(file_id = %file_id, "Rejecting malformed file id");
            return Err(ServiceError::InvalidRequest {
                message: format!("malformed file id '{file_id}'"),
            });
        }

        info!(file_id = %file_id, "Deleting document");

        let detach_status = self.knowledge_base.detach_file(file_id).await?;
        if is_success(detach_status) {
            info!(file_id = %file_id, status = detach_status, "Document detached from vector store");
        } else {
            warn!(
                file_id = %file_id,
                status = detach_status,
                "Vector store detach returned an error status"
            );
        }

        let delete_status = self.knowledge_base.delete_file(file_id).await?;
        if is_success(delete_status) {
            info!(file_id = %file_id, status = delete_status, "Document deleted from file store");
        } else {
            warn!(
                file_id = %file_id,
                status = delete_status,
                "File store deletion returned an error status"
            );
        }

        self.list_documents().await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{PlatformError, ServiceError};
    use crate::testing::{FakeKnowledgeBase, test_service};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_deleted_document_leaves_listing() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        kb.seed("file-1", "keep.pdf", 1);
        kb.seed("file-2", "drop.pdf", 2);
        let service = test_service(kb);

        let before = service.list_documents().await.unwrap();
        assert!(before.iter().any(|d| d.id == "file-2"));

        let after = service.delete_document("file-2").await.unwrap();

        assert!(after.iter().all(|d| d.id != "file-2"));
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_deletion_runs_after_failed_detach() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        kb.seed("file-1", "a.pdf", 1);
        kb.set_detach_status(Some(404));
        let service = test_service(kb.clone());

        service.delete_document("file-1").await.unwrap();

        let calls = kb.calls();
        assert_eq!(calls.detach, 1);
        assert_eq!(calls.delete, 1);
        assert_eq!(calls.list, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_still_returns_listing() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        kb.seed("file-1", "a.pdf", 1);
        let service = test_service(kb.clone());

        let docs = service.delete_document("file-missing").await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(kb.calls().delete, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        kb.seed("file-1", "a.pdf", 1);
        kb.set_transport_down(true);
        let service = test_service(kb.clone());

        let result = service.delete_document("file-1").await;

        assert!(matches!(
            result,
            Err(ServiceError::Platform(PlatformError::Connection { .. }))
        ));
        assert_eq!(kb.calls().delete, 0);
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_platform() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        kb.seed("file-1", "a.pdf", 1);
        let service = test_service(kb.clone());

        for id in ["../assistants/asst_test", "..", "file-1/../x", "file 1", ""] {
            let result = service.delete_document(id).await;
            assert!(
                matches!(result, Err(ServiceError::InvalidRequest { .. })),
                "{id:?} should be rejected"
            );
        }

        let calls = kb.calls();
        assert_eq!(calls.detach, 0);
        assert_eq!(calls.delete, 0);
        assert_eq!(calls.list, 0);
    }
}

//! In-memory knowledge base for service and handler tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

use crate::config::{ConfigPresence, PlatformConfig, RuntimeConfig, ServerConfig};
use crate::error::PlatformError;
use crate::platform::{FileObject, KnowledgeBase, VectorStoreFile};
use crate::service::GatewayService;

/// Number of calls made to each platform operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub probe: usize,
    pub list: usize,
    pub retrieve: usize,
    pub upload: usize,
    pub attach: usize,
    pub link: usize,
    pub detach: usize,
    pub delete: usize,
}

#[derive(Default)]
struct State {
    stored: Vec<FileObject>,
    attached: Vec<String>,
    failing_lookups: HashSet<String>,
    calls: CallCounts,
    next_id: usize,
    unreachable: bool,
    transport_down: bool,
    fail_list: bool,
    fail_upload: bool,
    fail_link: bool,
    detach_status: Option<u16>,
    lookup_gate: Option<Arc<Barrier>>,
}

/// Fake platform that keeps files in memory and can inject failures
#[derive(Default)]
pub struct FakeKnowledgeBase {
    state: Mutex<State>,
}

fn api_error(operation: &'static str, status: u16, message: &str) -> PlatformError {
    PlatformError::Api {
        operation,
        status,
        message: message.to_string(),
    }
}

/// A real `reqwest::Error`, produced by building a request with a bad URL
fn transport_error() -> PlatformError {
    let source = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    PlatformError::Connection {
        url: "fake://platform".to_string(),
        source,
    }
}

impl FakeKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a file and attach it to the vector store
    pub fn seed(&self, id: &str, filename: &str, created_at: i64) {
        let mut state = self.state.lock().unwrap();
        state.stored.push(FileObject {
            id: id.to_string(),
            filename: filename.to_string(),
            created_at,
        });
        state.attached.push(id.to_string());
    }

    pub fn calls(&self) -> CallCounts {
        self.state.lock().unwrap().calls
    }

    pub fn fail_lookup(&self, id: &str) {
        self.state.lock().unwrap().failing_lookups.insert(id.to_string());
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().unwrap().unreachable = !reachable;
    }

    pub fn set_transport_down(&self, down: bool) {
        self.state.lock().unwrap().transport_down = down;
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn set_fail_upload(&self, fail: bool) {
        self.state.lock().unwrap().fail_upload = fail;
    }

    pub fn set_fail_link(&self, fail: bool) {
        self.state.lock().unwrap().fail_link = fail;
    }

    /// Force the status returned by detach (and skip the detach itself)
    pub fn set_detach_status(&self, status: Option<u16>) {
        self.state.lock().unwrap().detach_status = status;
    }

    /// Hold every file lookup until `lookups` of them are in flight at once
    pub fn gate_lookups(&self, lookups: usize) {
        self.state.lock().unwrap().lookup_gate = Some(Arc::new(Barrier::new(lookups)));
    }
}

#[async_trait]
impl KnowledgeBase for FakeKnowledgeBase {
    async fn probe(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.probe += 1;
        !(state.unreachable || state.transport_down)
    }

    async fn list_attached(&self) -> Result<Vec<VectorStoreFile>, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.list += 1;
        if state.transport_down {
            return Err(transport_error());
        }
        if state.fail_list {
            return Err(api_error("Vector store file listing", 500, "listing broke"));
        }
        Ok(state
            .attached
            .iter()
            .map(|id| VectorStoreFile { id: id.clone() })
            .collect())
    }

    async fn retrieve_file(&self, file_id: &str) -> Result<FileObject, PlatformError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.calls.retrieve += 1;
            state.lookup_gate.clone()
        };
        if let Some(gate) = gate {
            gate.wait().await;
        }

        let state = self.state.lock().unwrap();
        if state.transport_down {
            return Err(transport_error());
        }
        if state.failing_lookups.contains(file_id) {
            return Err(api_error("File retrieval", 503, "try again later"));
        }
        state
            .stored
            .iter()
            .find(|f| f.id == file_id)
            .cloned()
            .ok_or_else(|| api_error("File retrieval", 404, "No such File object"))
    }

    async fn upload_file(
        &self,
        _content: Bytes,
        filename: &str,
    ) -> Result<FileObject, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.upload += 1;
        if state.transport_down {
            return Err(transport_error());
        }
        if state.fail_upload {
            return Err(api_error("File upload", 400, "Invalid file format"));
        }
        state.next_id += 1;
        let file = FileObject {
            id: format!("file-up{}", state.next_id),
            filename: filename.to_string(),
            created_at: 1_700_000_000,
        };
        state.stored.push(file.clone());
        Ok(file)
    }

    async fn attach_file(&self, file_id: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.attach += 1;
        if state.transport_down {
            return Err(transport_error());
        }
        state.attached.push(file_id.to_string());
        Ok(())
    }

    async fn link_assistant(&self) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.link += 1;
        if state.fail_link {
            return Err(api_error("Assistant update", 404, "No assistant found"));
        }
        Ok(())
    }

    async fn detach_file(&self, file_id: &str) -> Result<u16, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.detach += 1;
        if state.transport_down {
            return Err(transport_error());
        }
        if let Some(status) = state.detach_status {
            return Ok(status);
        }
        let before = state.attached.len();
        state.attached.retain(|id| id != file_id);
        Ok(if state.attached.len() < before { 200 } else { 404 })
    }

    async fn delete_file(&self, file_id: &str) -> Result<u16, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete += 1;
        if state.transport_down {
            return Err(transport_error());
        }
        let before = state.stored.len();
        state.stored.retain(|f| f.id != file_id);
        // The platform drops attachments of deleted files
        state.attached.retain(|id| id != file_id);
        Ok(if state.stored.len() < before { 200 } else { 404 })
    }
}

pub fn test_runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 1024 * 1024,
            locale: "en".to_string(),
        },
        platform: PlatformConfig {
            api_key: "sk-test".to_string(),
            assistant_id: "asst_test".to_string(),
            vector_store_id: "vs_test".to_string(),
            base_url: "http://platform.invalid/v1".to_string(),
            request_timeout: Duration::from_secs(5),
            list_limit: 100,
        },
        presence: ConfigPresence {
            api_key: true,
            assistant_id: true,
            vector_store_id: true,
        },
    }
}

pub fn test_service(knowledge_base: Arc<FakeKnowledgeBase>) -> GatewayService {
    GatewayService::new(Arc::new(test_runtime_config()), knowledge_base)
}

mod deletion;
mod listing;
mod upload;

pub use listing::UNKNOWN;
pub use upload::UploadPayload;

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ConfigPresence, RuntimeConfig};
use crate::i18n::I18n;
use crate::platform::KnowledgeBase;

/// A document attached to the vector store, as reported to API callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReference {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// Result of a status check
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    #[serde(flatten)]
    pub presence: ConfigPresence,
    #[serde(rename = "openaiConnection")]
    pub openai_connection: bool,
}

/// Main service coordinator
pub struct GatewayService {
    pub runtime_config: Arc<RuntimeConfig>,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
    pub i18n: Arc<I18n>,
}

impl GatewayService {
    /// Create a new service instance
    pub fn new(runtime_config: Arc<RuntimeConfig>, knowledge_base: Arc<dyn KnowledgeBase>) -> Self {
        info!(
            vector_store_id = %runtime_config.platform.vector_store_id,
            assistant_id = %runtime_config.platform.assistant_id,
            "Initializing knowledge base gateway"
        );

        let locale = &runtime_config.server.locale;
        let i18n = Arc::new(I18n::new());
        if !i18n.has_locale(locale) {
            warn!(locale = %locale, "No translations for configured locale, using English");
        }

        Self {
            runtime_config,
            knowledge_base,
            i18n,
        }
    }

    /// Locale used for user-facing messages
    pub fn locale(&self) -> &str {
        &self.runtime_config.server.locale
    }

    /// Report configuration presence and whether the platform answers.
    ///
    /// Re-probes on every call; nothing is cached.
    pub async fn status(&self) -> StatusReport {
        let openai_connection = self.knowledge_base.probe().await;
        StatusReport {
            presence: self.runtime_config.presence,
            openai_connection,
        }
    }
}

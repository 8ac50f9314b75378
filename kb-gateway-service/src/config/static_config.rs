//! Configuration read once at startup.
//! None of these settings can change while the process is running.

use serde::Deserialize;

/// Raw configuration as loaded from file and environment.
///
/// The platform identifiers are optional here so that a missing value can be
/// reported by name instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default)]
    pub openai: OpenAiSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Locale for user-facing messages (`en` or `fr`)
    #[serde(default = "default_locale")]
    pub locale: String,
}

/// Hosted AI platform settings
#[derive(Clone, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub assistant_id: Option<String>,

    #[serde(default)]
    pub vector_store_id: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Page size of the vector store file listing request
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            vector_store_id: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            list_limit: default_list_limit(),
        }
    }
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("assistant_id", &self.assistant_id)
            .field("vector_store_id", &self.vector_store_id)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("list_limit", &self.list_limit)
            .finish()
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
        max_upload_bytes: default_max_upload_bytes(),
        locale: default_locale(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    3000
}

pub(crate) fn default_max_upload_bytes() -> usize {
    512 * 1024 * 1024
}

pub(crate) fn default_locale() -> String {
    "en".to_string()
}

pub(crate) fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_list_limit() -> u32 {
    100
}

use serde::Serialize;
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};

mod loader;
mod static_config;

pub use loader::load_config;
pub use static_config::{GatewayConfig, ServerConfig};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ASSISTANT_ID_VAR: &str = "OPENAI_ASSISTANT_ID";
pub const VECTOR_STORE_ID_VAR: &str = "OPENAI_VECTOR_STORE_ID";
pub const PORT_VAR: &str = "PORT";

/// Which of the required platform values were supplied.
///
/// Serializes with the environment variable names as keys, which is the
/// shape `GET /status` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigPresence {
    #[serde(rename = "OPENAI_API_KEY")]
    pub api_key: bool,
    #[serde(rename = "OPENAI_ASSISTANT_ID")]
    pub assistant_id: bool,
    #[serde(rename = "OPENAI_VECTOR_STORE_ID")]
    pub vector_store_id: bool,
}

impl ConfigPresence {
    /// Names of the variables that were not supplied
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.api_key, API_KEY_VAR),
            (self.assistant_id, ASSISTANT_ID_VAR),
            (self.vector_store_id, VECTOR_STORE_ID_VAR),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }
}

/// Validated connection settings for the hosted platform.
#[derive(Clone)]
pub struct PlatformConfig {
    pub api_key: String,
    pub assistant_id: String,
    pub vector_store_id: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub list_limit: u32,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_key", &"<redacted>")
            .field("assistant_id", &self.assistant_id)
            .field("vector_store_id", &self.vector_store_id)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("list_limit", &self.list_limit)
            .finish()
    }
}

/// Configuration the service runs with. Built once in `main` and never
/// re-read.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub server: ServerConfig,
    pub platform: PlatformConfig,
    pub presence: ConfigPresence,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl GatewayConfig {
    pub fn presence(&self) -> ConfigPresence {
        ConfigPresence {
            api_key: non_empty(&self.openai.api_key).is_some(),
            assistant_id: non_empty(&self.openai.assistant_id).is_some(),
            vector_store_id: non_empty(&self.openai.vector_store_id).is_some(),
        }
    }

    /// Check that every required value is present.
    ///
    /// Fails with [`ServiceError::ConfigMissing`] naming all absent values.
    pub fn validate(self) -> ServiceResult<RuntimeConfig> {
        let presence = self.presence();

        let (Some(api_key), Some(assistant_id), Some(vector_store_id)) = (
            non_empty(&self.openai.api_key),
            non_empty(&self.openai.assistant_id),
            non_empty(&self.openai.vector_store_id),
        ) else {
            return Err(ServiceError::ConfigMissing {
                missing: presence.missing(),
            });
        };

        Ok(RuntimeConfig {
            server: self.server,
            platform: PlatformConfig {
                api_key,
                assistant_id,
                vector_store_id,
                base_url: self.openai.base_url.trim_end_matches('/').to_string(),
                request_timeout: Duration::from_secs(self.openai.request_timeout_secs),
                list_limit: self.openai.list_limit,
            },
            presence,
        })
    }
}

//! Configuration loading from files and environment variables.

use config::{Config, Environment, File};

use crate::error::{ServiceError, ServiceResult};

use super::static_config::GatewayConfig;
use super::{API_KEY_VAR, ASSISTANT_ID_VAR, PORT_VAR, VECTOR_STORE_ID_VAR};

/// Load configuration from `config.*`, `KB_GATEWAY__*` variables and the
/// well-known platform variables, in increasing order of precedence.
pub fn load_config() -> ServiceResult<GatewayConfig> {
    load_config_with(|name| std::env::var(name).ok())
}

/// Same as [`load_config`] but resolves the well-known variables through
/// `lookup`.
pub fn load_config_with<F>(lookup: F) -> ServiceResult<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let port = match lookup(PORT_VAR) {
        Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| ServiceError::Config {
            message: format!("{} must be a port number, got '{}': {}", PORT_VAR, raw, e),
        })?),
        None => None,
    };

    Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("KB_GATEWAY")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("openai.api_key", lookup(API_KEY_VAR))
        .and_then(|b| b.set_override_option("openai.assistant_id", lookup(ASSISTANT_ID_VAR)))
        .and_then(|b| {
            b.set_override_option("openai.vector_store_id", lookup(VECTOR_STORE_ID_VAR))
        })
        .and_then(|b| b.set_override_option("server.port", port.map(i64::from)))
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to apply environment overrides: {}", e),
        })?
        .build()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| ServiceError::Config {
            message: format!("Failed to deserialize config: {}", e),
        })
}

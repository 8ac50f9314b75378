use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::I18n;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing required configuration: {}", .missing.join(", "))]
    ConfigMissing { missing: Vec<&'static str> },

    #[error("No file received")]
    MissingInput,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Unable to list vector store files")]
    ListUnavailable(#[source] PlatformError),

    #[error("{0}")]
    Platform(#[from] PlatformError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Errors from the hosted AI platform client
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Connection failed to {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed (status {status}): {message}")]
    Api {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {url}")]
    InvalidResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Platform client setup failed: {message}")]
    Setup { message: String },
}

/// API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::MissingInput | ServiceError::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::ConfigMissing { .. } => "config_missing",
            ServiceError::MissingInput => "missing_input",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::PayloadTooLarge { .. } => "payload_too_large",
            ServiceError::ListUnavailable(_) => "list_unavailable",
            ServiceError::Platform(PlatformError::Api { .. }) => "upstream_rejected",
            ServiceError::Platform(PlatformError::Connection { .. }) => "transport_failure",
            ServiceError::Platform(PlatformError::InvalidResponse { .. }) => {
                "upstream_invalid_response"
            }
            ServiceError::Platform(PlatformError::Setup { .. }) => "client_setup",
            ServiceError::Config { .. } => "config_error",
        }
    }

    /// Get a user-friendly translated message
    pub fn user_message(&self, i18n: &I18n, locale: &str) -> String {
        match self {
            ServiceError::MissingInput => i18n.get(locale, "error-missing-file", None),
            ServiceError::ListUnavailable(_) => i18n.get(locale, "error-list-unavailable", None),
            ServiceError::Platform(PlatformError::Connection { .. }) => {
                i18n.get(locale, "error-transport", None)
            }
            ServiceError::Platform(PlatformError::InvalidResponse { .. }) => {
                i18n.get(locale, "error-invalid-response", None)
            }
            // Upstream rejections carry the platform's own message
            _ => self.to_string(),
        }
    }

    /// Convert to an error response with i18n support
    pub fn into_response_with_i18n(self, i18n: &I18n, locale: &str) -> Response {
        let status = self.status_code();
        let response = ErrorResponse {
            error: self.user_message(i18n, locale),
            code: Some(self.error_code().to_string()),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error wrapper with i18n support for API responses
pub struct I18nError {
    pub error: ServiceError,
    pub i18n: std::sync::Arc<I18n>,
    pub locale: String,
}

impl I18nError {
    pub fn new(error: ServiceError, i18n: std::sync::Arc<I18n>, locale: impl Into<String>) -> Self {
        Self {
            error,
            i18n,
            locale: locale.into(),
        }
    }
}

impl IntoResponse for I18nError {
    fn into_response(self) -> Response {
        self.error.into_response_with_i18n(&self.i18n, &self.locale)
    }
}

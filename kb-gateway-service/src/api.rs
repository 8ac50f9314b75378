//! HTTP API for the knowledge base gateway.
//!
//! This module provides the REST API endpoints for:
//! - Liveness and status reporting
//! - Document upload, listing and deletion

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{I18nError, ServiceError};
use crate::service::{GatewayService, StatusReport};

pub mod files;
use files::{delete_file_handler, list_files_handler, upload_file_handler};

/// Application state
pub struct AppState {
    pub service: Arc<GatewayService>,
}

impl AppState {
    /// Create an i18n-aware error from a service error
    pub fn i18n_error(&self, error: ServiceError) -> I18nError {
        I18nError::new(error, self.service.i18n.clone(), self.service.locale())
    }
}

/// Build the API router
pub fn router(service: Arc<GatewayService>) -> Router {
    let max_body_size = service.runtime_config.server.max_upload_bytes;
    let state = Arc::new(AppState { service });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/status", get(status_handler))
        .route("/files", get(list_files_handler))
        .route(
            "/files",
            post(upload_file_handler).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/files/{id}", delete(delete_file_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler(State(state): State<Arc<AppState>>) -> String {
    state
        .service
        .i18n
        .get(state.service.locale(), "root-banner", None)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusReport> {
    Json(state.service.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeKnowledgeBase, test_service};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_root_banner() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        let app = router(Arc::new(test_service(kb)));

        let (status, body) = send(app, Request::get("/").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "Knowledge base gateway is running"
        );
    }

    #[tokio::test]
    async fn test_status_never_fails_when_platform_is_down() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        kb.set_transport_down(true);
        let app = router(Arc::new(test_service(kb)));

        let (status, body) = send(app, Request::get("/status").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["openaiConnection"], false);
        assert_eq!(json["OPENAI_API_KEY"], true);
        assert_eq!(json["OPENAI_ASSISTANT_ID"], true);
        assert_eq!(json["OPENAI_VECTOR_STORE_ID"], true);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let kb = Arc::new(FakeKnowledgeBase::new());
        let app = router(Arc::new(test_service(kb)));

        let request = Request::get("/files")
            .header("origin", "https://shop.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}

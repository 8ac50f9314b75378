//! Document API endpoints.
//!
//! Every endpoint answers with the full, freshly fetched listing of the
//! vector store.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{I18nError, ServiceError};
use crate::service::{DocumentReference, UploadPayload};

use super::AppState;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

/// Listing returned by every document endpoint
#[derive(Serialize)]
pub struct FilesResponse {
    pub success: bool,
    pub files: Vec<DocumentReference>,
}

impl From<Vec<DocumentReference>> for FilesResponse {
    fn from(files: Vec<DocumentReference>) -> Self {
        Self {
            success: true,
            files,
        }
    }
}

/// Upload query parameters (raw body uploads only)
#[derive(Deserialize)]
pub struct UploadParams {
    pub filename: Option<String>,
}

/// How an upload body is encoded
#[derive(Debug, PartialEq, Eq)]
enum UploadEncoding {
    Multipart,
    OctetStream,
    Unsupported,
}

fn upload_encoding(content_type: Option<&str>) -> UploadEncoding {
    let Some(mime) = content_type.and_then(|ct| ct.parse::<mime::Mime>().ok()) else {
        return UploadEncoding::Unsupported;
    };

    if mime.type_() == mime::MULTIPART && mime.subtype() == mime::FORM_DATA {
        UploadEncoding::Multipart
    } else if mime.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str() {
        UploadEncoding::OctetStream
    } else {
        UploadEncoding::Unsupported
    }
}

/// Map a body read failure onto the service taxonomy
fn body_error(status: StatusCode, message: String, limit: usize) -> ServiceError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge { limit }
    } else {
        ServiceError::InvalidRequest { message }
    }
}

/// Read the `file` field of a multipart form
async fn read_multipart(
    mut multipart: Multipart,
    limit: usize,
) -> Result<Option<(Bytes, Option<String>)>, ServiceError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| body_error(e.status(), e.body_text(), limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| body_error(e.status(), e.body_text(), limit))?;
        return Ok(Some((data, filename)));
    }

    Ok(None)
}

/// Normalize a multipart or raw upload request into one payload.
///
/// Fails with [`ServiceError::MissingInput`] when no usable document is
/// present, before anything reaches the platform.
async fn extract_payload(
    state: &Arc<AppState>,
    filename: Option<String>,
    request: Request,
) -> Result<UploadPayload, ServiceError> {
    let limit = state.service.runtime_config.server.max_upload_bytes;
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match upload_encoding(content_type) {
        UploadEncoding::Multipart => {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|e| ServiceError::InvalidRequest {
                    message: e.body_text(),
                })?;
            let (data, part_filename) = read_multipart(multipart, limit)
                .await?
                .ok_or(ServiceError::MissingInput)?;
            UploadPayload::new(data, part_filename)
        }
        UploadEncoding::OctetStream => {
            let data = Bytes::from_request(request, state)
                .await
                .map_err(|e| body_error(e.status(), e.body_text(), limit))?;
            UploadPayload::new(data, filename)
        }
        UploadEncoding::Unsupported => Err(ServiceError::MissingInput),
    }
}

/// List all documents attached to the vector store
pub async fn list_files_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilesResponse>, I18nError> {
    let files = state
        .service
        .list_documents()
        .await
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(files.into()))
}

/// Upload a document as multipart field `file` or as a raw
/// `application/octet-stream` body
pub async fn upload_file_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Result<Json<FilesResponse>, I18nError> {
    let payload = extract_payload(&state, params.filename, request)
        .await
        .map_err(|e| state.i18n_error(e))?;

    info!(filename = %payload.filename, size = payload.content.len(), "Upload received");

    let files = state
        .service
        .upload_document(payload)
        .await
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(files.into()))
}

/// Delete a document from the vector store and the file store
pub async fn delete_file_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FilesResponse>, I18nError> {
    let files = state
        .service
        .delete_document(&id)
        .await
        .map_err(|e| state.i18n_error(e))?;
    Ok(Json(files.into()))
}

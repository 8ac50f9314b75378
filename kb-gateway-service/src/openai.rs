use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, Url, multipart};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::PlatformConfig;
use crate::error::PlatformError;
use crate::platform::{FileObject, KnowledgeBase, VectorStoreFile};

/// Header required by the vector store and assistant endpoints
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// OpenAI Files / Vector Stores / Assistants client
pub struct OpenAiClient {
    client: Client,
    base_url: Url,
    config: PlatformConfig,
}

impl OpenAiClient {
    /// Create a new client. Every request carries the configured timeout.
    pub fn new(config: PlatformConfig) -> Result<Self, PlatformError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| PlatformError::Setup {
            message: format!("invalid base URL {}: {}", config.base_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::Setup {
                message: format!("base URL {} cannot carry a path", config.base_url),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("kb-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Setup {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Append `segments` to the base URL. Each segment is percent-encoded
    /// on its own, so an id containing `/` or `..` stays a single segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Only fails for cannot-be-a-base URLs, rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn vector_store_files_url(&self) -> Url {
        self.endpoint(&["vector_stores", &self.config.vector_store_id, "files"])
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, PlatformError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| PlatformError::Connection {
                url: url.to_string(),
                source: e,
            })
    }

    async fn list_page(&self, limit: u32) -> Result<Response, PlatformError> {
        let url = self.vector_store_files_url();
        let request = self
            .client
            .get(url.clone())
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .query(&[("limit", limit)]);
        self.send(request, &url).await
    }
}

/// Turn a non-success response into [`PlatformError::Api`], preferring the
/// platform's `error.message` over the raw body.
async fn ensure_success(
    response: Response,
    operation: &'static str,
) -> Result<Response, PlatformError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(PlatformError::Api {
        operation,
        status,
        message,
    })
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
    url: &Url,
) -> Result<T, PlatformError> {
    response
        .json()
        .await
        .map_err(|e| PlatformError::InvalidResponse {
            url: url.to_string(),
            source: e,
        })
}

#[async_trait]
impl KnowledgeBase for OpenAiClient {
    async fn probe(&self) -> bool {
        match self.list_page(1).await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(
                    status = resp.status().as_u16(),
                    "Platform reachability probe rejected"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "Platform reachability probe failed");
                false
            }
        }
    }

    async fn list_attached(&self) -> Result<Vec<VectorStoreFile>, PlatformError> {
        let url = self.vector_store_files_url();
        let response = self.list_page(self.config.list_limit).await?;
        let response = ensure_success(response, "Vector store file listing").await?;
        let page: ListResponse<VectorStoreFile> = parse_json(response, &url).await?;

        if page.has_more {
            warn!(
                limit = self.config.list_limit,
                "Vector store holds more files than a single listing page returns"
            );
        }

        Ok(page.data)
    }

    async fn retrieve_file(&self, file_id: &str) -> Result<FileObject, PlatformError> {
        let url = self.endpoint(&["files", file_id]);
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let response = ensure_success(response, "File retrieval").await?;
        parse_json(response, &url).await
    }

    async fn upload_file(
        &self,
        content: Bytes,
        filename: &str,
    ) -> Result<FileObject, PlatformError> {
        let url = self.endpoint(&["files"]);
        let size = content.len();

        let form = multipart::Form::new().text("purpose", "assistants").part(
            "file",
            multipart::Part::stream_with_length(content, size as u64)
                .file_name(filename.to_string()),
        );

        let response = self
            .send(self.client.post(url.clone()).multipart(form), &url)
            .await?;
        let response = ensure_success(response, "File upload").await?;
        let file: FileObject = parse_json(response, &url).await?;

        debug!(file_id = %file.id, filename = %filename, size, "File stored on platform");
        Ok(file)
    }

    async fn attach_file(&self, file_id: &str) -> Result<(), PlatformError> {
        let url = self.vector_store_files_url();
        let request = self
            .client
            .post(url.clone())
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .json(&json!({ "file_id": file_id }));

        let response = self.send(request, &url).await?;
        ensure_success(response, "Vector store attachment").await?;
        Ok(())
    }

    async fn link_assistant(&self) -> Result<(), PlatformError> {
        let url = self.endpoint(&["assistants", &self.config.assistant_id]);
        let request = self
            .client
            .post(url.clone())
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .json(&json!({
                "tool_resources": {
                    "file_search": { "vector_store_ids": [&self.config.vector_store_id] }
                }
            }));

        let response = self.send(request, &url).await?;
        ensure_success(response, "Assistant update").await?;
        Ok(())
    }

    async fn detach_file(&self, file_id: &str) -> Result<u16, PlatformError> {
        let url = self.endpoint(&[
            "vector_stores",
            &self.config.vector_store_id,
            "files",
            file_id,
        ]);
        let request = self
            .client
            .delete(url.clone())
            .header(BETA_HEADER.0, BETA_HEADER.1);
        let response = self.send(request, &url).await?;
        Ok(response.status().as_u16())
    }

    async fn delete_file(&self, file_id: &str) -> Result<u16, PlatformError> {
        let url = self.endpoint(&["files", file_id]);
        let response = self.send(self.client.delete(url.clone()), &url).await?;
        Ok(response.status().as_u16())
    }
}

// Internal OpenAI API types

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

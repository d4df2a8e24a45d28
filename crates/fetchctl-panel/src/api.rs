//! HTTP collaborator for the connector API.

use std::time::Duration;

use async_trait::async_trait;
use fetchctl_api_models::{AddTorrentRequest, ErrorResponse, TorrentListResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{ApiError, ApiResult};

const PATH_TORRENTS: &str = "torrents/";
const PATH_HEALTH: &str = "api/health";
const PATH_READY: &str = "api/ready";

/// Calls the panel makes against the connector.
#[async_trait]
pub trait TorrentApi: Send + Sync {
    /// Submit a torrent; the decoded response body is returned verbatim for display.
    async fn add_torrent(&self, request: &AddTorrentRequest) -> ApiResult<Value>;

    /// Fetch the current torrent list.
    async fn list_torrents(&self) -> ApiResult<TorrentListResponse>;

    /// Liveness passthrough.
    async fn health(&self) -> ApiResult<Value>;

    /// Readiness passthrough.
    async fn ready(&self) -> ApiResult<Value>;
}

/// [`TorrentApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTorrentApi {
    client: Client,
    base_url: Url,
}

impl HttpTorrentApi {
    /// Build a client with an optional per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the underlying HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| ApiError::Client { source })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing client. API paths are resolved below the base URL's path.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Base URL every path is joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &'static str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| ApiError::Endpoint { path, source })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &'static str) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        let endpoint = url.to_string();
        debug!(%endpoint, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ApiError::status(response.status().as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[async_trait]
impl TorrentApi for HttpTorrentApi {
    async fn add_torrent(&self, request: &AddTorrentRequest) -> ApiResult<Value> {
        let url = self.endpoint(PATH_TORRENTS)?;
        let endpoint = url.to_string();
        debug!(%endpoint, "POST");
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(classify_failure(response).await);
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn list_torrents(&self) -> ApiResult<TorrentListResponse> {
        self.get_json(PATH_TORRENTS).await
    }

    async fn health(&self) -> ApiResult<Value> {
        self.get_json(PATH_HEALTH).await
    }

    async fn ready(&self) -> ApiResult<Value> {
        self.get_json(PATH_READY).await
    }
}

/// Turn a non-2xx response into a status error, preferring the backend's own message.
async fn classify_failure(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let bytes = response.bytes().await.unwrap_or_default();
    match serde_json::from_slice::<ErrorResponse>(&bytes) {
        Ok(body) if !body.error.trim().is_empty() => ApiError::Status {
            status,
            message: body.error,
        },
        _ => ApiError::status(status),
    }
}

//! HTTP client for the Mr. Feynman backend.

use std::time::Duration;

use tracing::debug;

use crate::api::{AnalyzeRequest, AnalyzeResponse, HistoryEntry, UploadFailure, UploadResponse};
use crate::error::CoachError;

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend HTTP API (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// TCP connection timeout.
    pub connect_timeout: Duration,
    /// Per-request read timeout. Analysis runs a local LLM, so generous.
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Create a config with sensible defaults.
    ///
    /// - connect_timeout: 3 s
    /// - request_timeout: 120 s
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Thin typed wrapper over the three backend endpoints. Never retries;
/// every failure maps to one [`CoachError`] variant.
#[derive(Clone)]
pub struct BackendClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, CoachError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CoachError::Connect {
                url: config.base_url.clone(),
                detail: e.to_string(),
            })?;
        Ok(BackendClient { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// POST the composed payload to `/api/v1/analyze`.
    ///
    /// # Returns
    /// - `Ok(AnalyzeResponse)` — on a 2xx response with parseable JSON.
    /// - `Err(CoachError::Connect)` — when the TCP connection fails.
    /// - `Err(CoachError::Http)` — on a non-2xx response.
    /// - `Err(CoachError::Json)` — when the body cannot be parsed.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, CoachError> {
        let url = format!("{}/api/v1/analyze", self.config.base_url);
        debug!(concept = %request.concept, purpose = %request.purpose, "submitting analysis");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| CoachError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(CoachError::Http {
                status: resp.status().as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| CoachError::Json {
            context: "analyze body".into(),
            detail: e.to_string(),
        })?;

        serde_json::from_slice::<AnalyzeResponse>(&bytes).map_err(|e| CoachError::Json {
            context: "analyze response".into(),
            detail: e.to_string(),
        })
    }

    /// Upload a reference document to `/api/v2/upload` as multipart field
    /// `file`. A non-2xx body is probed for the backend's `{detail}` shape
    /// before falling back to a plain HTTP error.
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, CoachError> {
        let url = format!("{}/api/v2/upload", self.config.base_url);
        debug!(filename, size = bytes.len(), "uploading reference document");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CoachError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| CoachError::Json {
            context: "upload body".into(),
            detail: e.to_string(),
        })?;

        if !status.is_success() {
            if let Ok(failure) = serde_json::from_slice::<UploadFailure>(&body) {
                return Err(CoachError::Upload {
                    detail: failure.detail,
                });
            }
            return Err(CoachError::Http {
                status: status.as_u16(),
                url,
            });
        }

        serde_json::from_slice::<UploadResponse>(&body).map_err(|e| CoachError::Json {
            context: "upload response".into(),
            detail: e.to_string(),
        })
    }

    /// Fetch the attempt list from `/api/v1/history`, newest first.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, CoachError> {
        let url = format!("{}/api/v1/history", self.config.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoachError::Connect {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(CoachError::Http {
                status: resp.status().as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| CoachError::Json {
            context: "history body".into(),
            detail: e.to_string(),
        })?;

        serde_json::from_slice::<Vec<HistoryEntry>>(&bytes).map_err(|e| CoachError::Json {
            context: "history response".into(),
            detail: e.to_string(),
        })
    }
}

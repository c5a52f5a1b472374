//! REST client for the Gemini video endpoints.
//!
//! Wraps long-running video submission, operation polling and generated
//! asset download using [`reqwest`].

use serde::de::DeserializeOwned;

use crate::config::VeoConfig;
use crate::messages::{Operation, PredictVideoRequest};

/// Header carrying the API key on submit and poll calls.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
pub struct VeoApi {
    client: reqwest::Client,
    config: VeoConfig,
}

/// Errors from the Gemini REST layer.
#[derive(Debug, thiserror::Error)]
pub enum VeoApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl VeoApi {
    /// Create a client whose requests time out after
    /// [`VeoConfig::request_timeout`].
    pub fn new(config: VeoConfig) -> Result<Self, VeoApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Start a video generation.
    ///
    /// Sends `POST {base}/models/{model}:predictLongRunning` and returns
    /// the operation handle to poll.
    pub async fn predict_long_running(
        &self,
        request: &PredictVideoRequest,
    ) -> Result<Operation, VeoApiError> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.config.base_url, self.config.model
        );

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let operation: Operation = Self::parse_response(response).await?;
        tracing::debug!(
            model = %self.config.model,
            operation = %operation.name,
            done = operation.done,
            "Submitted long-running video request",
        );
        Ok(operation)
    }

    /// Fetch the current state of an operation by name.
    ///
    /// Sends `GET {base}/{operation_name}`.
    pub async fn get_operation(&self, operation_name: &str) -> Result<Operation, VeoApiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.config.base_url, operation_name))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download a generated asset.
    ///
    /// Asset URIs are only retrievable with the API key attached as a
    /// `key` query parameter.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, VeoApiError> {
        let response = self
            .client
            .get(with_api_key(uri, &self.config.api_key))
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        tracing::debug!(size_bytes = bytes.len(), "Downloaded generated asset");
        Ok(bytes.to_vec())
    }

    // ---- private helpers ----

    /// Returns the response unchanged on success, or an
    /// [`VeoApiError::ApiError`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VeoApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), "Gemini API returned an error status");
            return Err(VeoApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, VeoApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Append `key=<api_key>` to `uri`, respecting an existing query string.
pub fn with_api_key(uri: &str, api_key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}key={api_key}")
}

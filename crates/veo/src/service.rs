//! The remote video-generation service as seen by the pipeline.
//!
//! [`VeoApi`] is the production implementation; tests substitute
//! scripted fakes.

use async_trait::async_trait;

use crate::api::{VeoApi, VeoApiError};
use crate::messages::{Operation, PredictVideoRequest};

/// Submit / poll / fetch contract of a long-running video generator.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Submit a generation request and return its operation handle.
    async fn submit(&self, request: &PredictVideoRequest) -> Result<Operation, VeoApiError>;

    /// Re-read an operation. The returned handle replaces the old one.
    async fn refresh(&self, operation: &Operation) -> Result<Operation, VeoApiError>;

    /// Fetch the bytes behind a generated asset URI.
    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>, VeoApiError>;
}

#[async_trait]
impl VideoService for VeoApi {
    async fn submit(&self, request: &PredictVideoRequest) -> Result<Operation, VeoApiError> {
        self.predict_long_running(request).await
    }

    async fn refresh(&self, operation: &Operation) -> Result<Operation, VeoApiError> {
        self.get_operation(&operation.name).await
    }

    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>, VeoApiError> {
        self.download(uri).await
    }
}

//! Wire types for the Gemini `predictLongRunning` endpoint and the
//! long-running operation resource it returns.
//!
//! A finished operation looks like:
//!
//! ```json
//! {
//!   "name": "models/veo-2.0-generate-001/operations/abc123",
//!   "done": true,
//!   "response": {
//!     "generateVideoResponse": {
//!       "generatedSamples": [{ "video": { "uri": "https://…:download?alt=media" } }]
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body of `POST /models/{model}:predictLongRunning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictVideoRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

impl PredictVideoRequest {
    /// A single-instance request conditioned on one image.
    pub fn image_to_video(prompt: impl Into<String>, image: InlineImage, sample_count: u32) -> Self {
        Self {
            instances: vec![VideoInstance {
                prompt: prompt.into(),
                image: Some(image),
            }],
            parameters: VideoParameters { sample_count },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInstance {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
}

/// Image bytes carried inline as base64 text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    /// Number of videos to generate.
    pub sample_count: u32,
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// A long-running operation handle.
///
/// Returned by submission and by every poll. `done` is absent (false)
/// until the job finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<OperationResponse>,
}

impl Operation {
    /// URI of the first generated video, if the operation produced one.
    pub fn first_video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .iter()
            .find_map(|sample| sample.video.as_ref()?.uri.as_deref())
            .filter(|uri| !uri.is_empty())
    }

    /// Reasons given by the service for filtering generated media.
    pub fn filtered_reasons(&self) -> &[String] {
        self.response
            .as_ref()
            .and_then(|r| r.generate_video_response.as_ref())
            .map(|r| r.rai_media_filtered_reasons.as_slice())
            .unwrap_or_default()
    }
}

/// `google.rpc.Status` reported by a failed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    pub rai_media_filtered_count: u32,
    #[serde(default)]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub uri: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

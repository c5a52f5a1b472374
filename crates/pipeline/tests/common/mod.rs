//! Shared fixtures for pipeline integration tests.
//!
//! [`ScriptedService`] replays canned submit / poll / fetch replies and
//! records every call it receives.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use framecast_core::blob::BlobStore;
use framecast_core::frames::{FileHandle, FrameCollection};
use framecast_pipeline::{GenerationController, Orchestrator, PollPolicy};
use framecast_veo::messages::{
    GenerateVideoResponse, GeneratedSample, Operation, OperationError, OperationResponse,
    PredictVideoRequest, VideoRef,
};
use framecast_veo::{VeoApiError, VideoService};

pub const OPERATION_NAME: &str = "models/veo-2.0-generate-001/operations/op-1";
pub const VIDEO_URI: &str = "https://generativelanguage.googleapis.com/v1beta/files/v1:download?alt=media";
pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42-video";

// ---------------------------------------------------------------------------
// Canned operations
// ---------------------------------------------------------------------------

pub fn pending() -> Operation {
    Operation {
        name: OPERATION_NAME.to_string(),
        done: false,
        error: None,
        response: None,
    }
}

pub fn finished_with(samples: Vec<GeneratedSample>, filtered: Vec<String>) -> Operation {
    Operation {
        name: OPERATION_NAME.to_string(),
        done: true,
        error: None,
        response: Some(OperationResponse {
            generate_video_response: Some(GenerateVideoResponse {
                generated_samples: samples,
                rai_media_filtered_count: filtered.len() as u32,
                rai_media_filtered_reasons: filtered,
            }),
        }),
    }
}

pub fn finished() -> Operation {
    finished_with(
        vec![GeneratedSample {
            video: Some(VideoRef {
                uri: Some(VIDEO_URI.to_string()),
            }),
        }],
        vec![],
    )
}

pub fn failed(code: i32, message: &str) -> Operation {
    Operation {
        name: OPERATION_NAME.to_string(),
        done: true,
        error: Some(OperationError {
            code,
            message: message.to_string(),
        }),
        response: None,
    }
}

// ---------------------------------------------------------------------------
// Scripted service
// ---------------------------------------------------------------------------

/// A scripted reply; `Fail` becomes [`VeoApiError::ApiError`].
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(u16),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T, VeoApiError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Fail(status) => Err(VeoApiError::ApiError {
                status,
                body: format!("scripted failure {status}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit,
    Refresh,
    FetchAsset(String),
}

/// Fake remote service.
///
/// Submissions return queued replies (then `pending()`), polls return
/// queued replies (then `pending()` forever), and fetches return
/// [`VIDEO_BYTES`] unless told to fail.
#[derive(Default)]
pub struct ScriptedService {
    submits: Mutex<VecDeque<Reply<Operation>>>,
    polls: Mutex<VecDeque<Reply<Operation>>>,
    fetch_failure: Mutex<Option<u16>>,
    calls: Mutex<Vec<Call>>,
    submitted: Mutex<Vec<PredictVideoRequest>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_submit(&self, reply: Reply<Operation>) -> &Self {
        self.submits.lock().unwrap().push_back(reply);
        self
    }

    pub fn on_poll(&self, reply: Reply<Operation>) -> &Self {
        self.polls.lock().unwrap().push_back(reply);
        self
    }

    pub fn fail_fetch(&self, status: u16) -> &Self {
        *self.fetch_failure.lock().unwrap() = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn submitted(&self) -> Vec<PredictVideoRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoService for ScriptedService {
    async fn submit(&self, request: &PredictVideoRequest) -> Result<Operation, VeoApiError> {
        self.calls.lock().unwrap().push(Call::Submit);
        self.submitted.lock().unwrap().push(request.clone());
        let reply = self.submits.lock().unwrap().pop_front();
        reply.unwrap_or(Reply::Ok(pending())).into_result()
    }

    async fn refresh(&self, operation: &Operation) -> Result<Operation, VeoApiError> {
        assert_eq!(operation.name, OPERATION_NAME, "poll must reuse the handle");
        self.calls.lock().unwrap().push(Call::Refresh);
        let reply = self.polls.lock().unwrap().pop_front();
        reply.unwrap_or(Reply::Ok(pending())).into_result()
    }

    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>, VeoApiError> {
        self.calls.lock().unwrap().push(Call::FetchAsset(uri.to_string()));
        match *self.fetch_failure.lock().unwrap() {
            Some(status) => Reply::Fail(status).into_result(),
            None => Ok(VIDEO_BYTES.to_vec()),
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn orchestrator(service: &Arc<ScriptedService>, blobs: &BlobStore, policy: PollPolicy) -> Orchestrator {
    Orchestrator::new(service.clone(), blobs.clone(), policy)
}

pub fn controller(service: &Arc<ScriptedService>, blobs: &BlobStore) -> GenerationController {
    GenerationController::new(orchestrator(service, blobs, PollPolicy::default()))
}

/// A collection of in-memory PNG-typed frames whose bytes are their names.
pub fn frames(blobs: &BlobStore, names: &[&str]) -> FrameCollection {
    let mut frames = FrameCollection::new(blobs.clone());
    frames.add(
        names
            .iter()
            .map(|n| FileHandle::from_bytes(*n, Some("image/png".into()), n.as_bytes().to_vec())),
    );
    frames
}

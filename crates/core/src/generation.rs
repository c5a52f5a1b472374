//! Generation request validation and the generation state machine.
//!
//! ```text
//!            begin                 succeed
//!   Idle ─────────────► Loading ───────────► Success
//!    ▲                  │  ▲ │   fail
//!    │ (session start)  │  └─┘ ───────────► Error
//!                       │ progress
//!                       └──────────────────► Cancelled
//!                             cancel
//! ```
//!
//! Every terminal state (and `Idle`) may `begin` again. A failed
//! validation moves any non-loading state straight to `Error`.

use std::fmt;

use serde::Serialize;

use crate::blob::BlobHandle;
use crate::error::CoreError;
use crate::frames::{Frame, FrameCollection};

// ---------------------------------------------------------------------------
// Fixed messages
// ---------------------------------------------------------------------------

/// Shown when generate is triggered without a prompt or without frames.
pub const VALIDATION_MESSAGE: &str = "Please provide a prompt and at least one frame.";

/// Progress text set when a generation is accepted.
pub const PROGRESS_INITIALIZING: &str = "Initializing...";

/// Prefix applied to every failure surfaced in [`GenerationState::Error`].
pub const FAILURE_PREFIX: &str = "Generation failed: ";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Discriminant of [`GenerationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Idle,
    Loading,
    Success,
    Error,
    Cancelled,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationStatus::Idle => "idle",
            GenerationStatus::Loading => "loading",
            GenerationStatus::Success => "success",
            GenerationStatus::Error => "error",
            GenerationStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Video asset
// ---------------------------------------------------------------------------

/// A downloaded video, playable through its blob URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    blob: BlobHandle,
    mime_type: String,
    size_bytes: u64,
}

impl VideoAsset {
    pub fn new(blob: BlobHandle, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            blob,
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    pub fn blob(&self) -> &BlobHandle {
        &self.blob
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle of the current (or most recent) generation.
///
/// Only `Loading` carries progress text, only `Success` carries a result
/// and only `Error` carries a failure description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerationState {
    #[default]
    Idle,
    Loading {
        progress: String,
    },
    Success {
        video: VideoAsset,
    },
    Error {
        detail: String,
    },
    Cancelled,
}

impl GenerationState {
    pub fn status(&self) -> GenerationStatus {
        match self {
            GenerationState::Idle => GenerationStatus::Idle,
            GenerationState::Loading { .. } => GenerationStatus::Loading,
            GenerationState::Success { .. } => GenerationStatus::Success,
            GenerationState::Error { .. } => GenerationStatus::Error,
            GenerationState::Cancelled => GenerationStatus::Cancelled,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, GenerationState::Loading { .. })
    }

    pub fn progress_message(&self) -> Option<&str> {
        match self {
            GenerationState::Loading { progress } => Some(progress),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&VideoAsset> {
        match self {
            GenerationState::Success { video } => Some(video),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            GenerationState::Error { detail } => Some(detail),
            _ => None,
        }
    }

    /// Accept a validated request: any non-loading state -> `Loading`.
    pub fn begin(&mut self, progress: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_not_loading("begin")?;
        *self = GenerationState::Loading {
            progress: progress.into(),
        };
        Ok(())
    }

    /// Replace the progress text of a running generation.
    pub fn progress(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        match self {
            GenerationState::Loading { progress } => {
                *progress = message.into();
                Ok(())
            }
            _ => Err(self.invalid("report progress")),
        }
    }

    pub fn succeed(&mut self, video: VideoAsset) -> Result<(), CoreError> {
        self.ensure_loading("succeed")?;
        *self = GenerationState::Success { video };
        Ok(())
    }

    pub fn fail(&mut self, detail: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_loading("fail")?;
        *self = GenerationState::Error {
            detail: detail.into(),
        };
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), CoreError> {
        self.ensure_loading("cancel")?;
        *self = GenerationState::Cancelled;
        Ok(())
    }

    /// Record a validation failure without ever entering `Loading`.
    pub fn reject(&mut self, detail: impl Into<String>) -> Result<(), CoreError> {
        self.ensure_not_loading("reject a request")?;
        *self = GenerationState::Error {
            detail: detail.into(),
        };
        Ok(())
    }

    fn ensure_loading(&self, action: &'static str) -> Result<(), CoreError> {
        if self.is_loading() {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn ensure_not_loading(&self, action: &'static str) -> Result<(), CoreError> {
        if self.is_loading() {
            Err(self.invalid(action))
        } else {
            Ok(())
        }
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            from: self.status(),
            action,
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Snapshot of everything one generation needs.
///
/// Holds the full ordered frame list, but only the reference frame (the
/// head of the list) conditions the remote generation today.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    reference_frame: Frame,
    frames: Vec<Frame>,
    include_sound: bool,
}

impl GenerationRequest {
    /// Validate the inputs and snapshot the collection.
    ///
    /// Fails with [`VALIDATION_MESSAGE`] when the prompt is blank or the
    /// collection is empty.
    pub fn build(
        prompt: &str,
        frames: &FrameCollection,
        include_sound: bool,
    ) -> Result<Self, CoreError> {
        let reference_frame = match frames.first() {
            Some(frame) if !prompt.trim().is_empty() => frame.clone(),
            _ => return Err(CoreError::Validation(VALIDATION_MESSAGE.to_string())),
        };

        Ok(Self {
            prompt: prompt.to_string(),
            reference_frame,
            frames: frames.as_slice().to_vec(),
            include_sound,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The frame sent to the remote service.
    pub fn reference_frame(&self) -> &Frame {
        &self.reference_frame
    }

    /// The complete ordered collection at submission time.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn include_sound(&self) -> bool {
        self.include_sound
    }
}

/// Whether the generate trigger should be enabled.
pub fn can_generate(prompt: &str, frames: &FrameCollection, state: &GenerationState) -> bool {
    !prompt.trim().is_empty() && !frames.is_empty() && !state.is_loading()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

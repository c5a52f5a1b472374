//! Binds the orchestrator to the generation state machine.
//!
//! The controller owns the session's [`GenerationState`] and publishes
//! every change on a [`tokio::sync::watch`] channel. Presentation code
//! subscribes to render progress and results; it never mutates the
//! state itself.

use framecast_core::error::CoreError;
use framecast_core::frames::FrameCollection;
use framecast_core::generation::{
    can_generate, GenerationRequest, GenerationState, PROGRESS_INITIALIZING,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::GenerationError;
use crate::orchestrator::Orchestrator;

/// Session-level entry point for video generation.
pub struct GenerationController {
    orchestrator: Orchestrator,
    state: watch::Sender<GenerationState>,
}

impl GenerationController {
    /// Start in [`GenerationState::Idle`].
    pub fn new(orchestrator: Orchestrator) -> Self {
        let (state, _) = watch::channel(GenerationState::Idle);
        Self {
            orchestrator,
            state,
        }
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    /// Whether the generate trigger should be enabled right now.
    pub fn can_generate(&self, prompt: &str, frames: &FrameCollection) -> bool {
        can_generate(prompt, frames, &self.state.borrow()) && !self.orchestrator.is_busy()
    }

    /// Validate, run and record one generation.
    ///
    /// Returns the terminal state. The only error is
    /// [`GenerationError::Busy`], returned without touching the state
    /// when another generation is still running. Every other failure is
    /// recorded as [`GenerationState::Error`] (or
    /// [`GenerationState::Cancelled`]).
    pub async fn generate(
        &self,
        prompt: &str,
        frames: &FrameCollection,
        include_sound: bool,
        cancel: &CancellationToken,
    ) -> Result<GenerationState, GenerationError> {
        let flight = self.orchestrator.acquire().inspect_err(|_| {
            tracing::warn!("Generate requested while a generation is in progress");
        })?;

        let request = match GenerationRequest::build(prompt, frames, include_sound) {
            Ok(request) => request,
            Err(e) => {
                let error = GenerationError::Validation(match e {
                    CoreError::Validation(message) => message,
                    other => other.to_string(),
                });
                tracing::info!(reason = %error, "Generation request rejected");
                let detail = error.user_message();
                self.apply(|state| state.reject(detail));
                return Ok(self.state());
            }
        };

        self.apply(|state| state.begin(PROGRESS_INITIALIZING));

        let outcome = self
            .orchestrator
            .run(
                &flight,
                &request,
                |message| {
                    tracing::info!(progress = %message, "Generation progress");
                    self.apply(|state| state.progress(message));
                },
                cancel,
            )
            .await;

        match outcome {
            Ok(video) => self.apply(|state| state.succeed(video)),
            Err(GenerationError::Cancelled) => {
                tracing::info!("Video generation cancelled");
                self.apply(GenerationState::cancel);
            }
            Err(e) => {
                tracing::error!(error = %e, "Video generation failed");
                let detail = e.user_message();
                self.apply(|state| state.fail(detail));
            }
        }

        drop(flight);
        Ok(self.state())
    }

    fn apply<F>(&self, transition: F)
    where
        F: FnOnce(&mut GenerationState) -> Result<(), CoreError>,
    {
        self.state.send_modify(|state| {
            if let Err(e) = transition(state) {
                tracing::error!(error = %e, "Rejected generation state transition");
            }
        });
    }
}

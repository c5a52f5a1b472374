//! Drives one video generation against the remote service.
//!
//! ```text
//! encode frame -> submit -> [wait, report, poll]* -> extract uri -> fetch -> blob
//! ```
//!
//! Every suspension point races the caller's [`CancellationToken`]. Only
//! one generation may run per [`Orchestrator`] at a time; a concurrent
//! call is rejected with [`GenerationError::Busy`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framecast_core::blob::{BlobSource, BlobStore};
use framecast_core::generation::{GenerationRequest, VideoAsset};
use framecast_veo::messages::{Operation, PredictVideoRequest};
use framecast_veo::VideoService;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::encode::encode_frame;
use crate::error::GenerationError;
use crate::poll::{processing_message, PollPolicy};

pub const PROGRESS_ENCODING: &str = "Encoding image...";
pub const PROGRESS_SUBMITTING: &str = "Starting video generation...";
pub const PROGRESS_FINALIZING: &str = "Finalizing video...";
pub const PROGRESS_FETCHING: &str = "Fetching video...";

/// Videos requested per generation.
pub const SAMPLE_COUNT: u32 = 1;
/// Content type recorded for downloaded videos.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Single-flight driver for the submit / poll / fetch workflow.
pub struct Orchestrator {
    service: Arc<dyn VideoService>,
    blobs: BlobStore,
    policy: PollPolicy,
    in_flight: AtomicBool,
}

/// Proof that the holder owns the orchestrator's single generation slot.
///
/// Released on drop, whatever way the generation ends.
pub struct InFlight<'a> {
    slot: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    /// Downloaded videos are registered in `blobs`.
    pub fn new(service: Arc<dyn VideoService>, blobs: BlobStore, policy: PollPolicy) -> Self {
        Self {
            service,
            blobs,
            policy,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the generation slot, or fail with [`GenerationError::Busy`].
    pub fn acquire(&self) -> Result<InFlight<'_>, GenerationError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GenerationError::Busy)?;
        Ok(InFlight {
            slot: &self.in_flight,
        })
    }

    /// Claim the slot and run one generation.
    pub async fn generate<P>(
        &self,
        request: &GenerationRequest,
        on_progress: P,
        cancel: &CancellationToken,
    ) -> Result<VideoAsset, GenerationError>
    where
        P: FnMut(&str) + Send,
    {
        let flight = self.acquire()?;
        self.run(&flight, request, on_progress, cancel).await
    }

    /// Run one generation in a slot claimed from this orchestrator.
    ///
    /// A guard acquired from another orchestrator is refused with
    /// [`GenerationError::Busy`]. Progress messages are delivered to
    /// `on_progress` in order, each before the next suspension point.
    pub async fn run<P>(
        &self,
        flight: &InFlight<'_>,
        request: &GenerationRequest,
        mut on_progress: P,
        cancel: &CancellationToken,
    ) -> Result<VideoAsset, GenerationError>
    where
        P: FnMut(&str) + Send,
    {
        if !std::ptr::eq(flight.slot, &self.in_flight) {
            tracing::warn!("Generation slot belongs to another orchestrator");
            return Err(GenerationError::Busy);
        }

        let frame = request.reference_frame();
        let unused_frames = request.frames().len().saturating_sub(1);
        tracing::info!(
            frame_id = %frame.id(),
            include_sound = request.include_sound(),
            "Starting video generation",
        );
        if unused_frames > 0 {
            // Multi-frame conditioning is not supported by the service call.
            tracing::debug!(unused_frames, "Only the reference frame is sent");
        }

        on_progress(PROGRESS_ENCODING);
        let image = cancellable(cancel, encode_frame(frame)).await??;

        on_progress(PROGRESS_SUBMITTING);
        let submission = PredictVideoRequest::image_to_video(request.prompt(), image, SAMPLE_COUNT);
        let operation = cancellable(cancel, self.service.submit(&submission))
            .await?
            .map_err(GenerationError::Submission)?;
        tracing::info!(operation = %operation.name, "Video generation submitted");

        let operation = self
            .poll_until_done(operation, &mut on_progress, cancel)
            .await?;

        on_progress(PROGRESS_FINALIZING);
        if let Some(error) = &operation.error {
            return Err(GenerationError::OperationFailed {
                code: error.code,
                message: error.message.clone(),
            });
        }
        let uri = operation
            .first_video_uri()
            .ok_or_else(|| GenerationError::MissingResult {
                filtered_reasons: operation.filtered_reasons().to_vec(),
            })?;

        on_progress(PROGRESS_FETCHING);
        let bytes = cancellable(cancel, self.service.fetch_asset(uri))
            .await?
            .map_err(GenerationError::Download)?;

        let size_bytes = bytes.len() as u64;
        let blob = self.blobs.register(
            BlobSource::Memory(bytes.into()),
            Some(VIDEO_MIME_TYPE.to_string()),
        );
        tracing::info!(
            operation = %operation.name,
            size_bytes,
            url = %blob.url(),
            "Video generation finished",
        );

        Ok(VideoAsset::new(blob, VIDEO_MIME_TYPE, size_bytes))
    }

    /// Poll until the operation reports `done` or the policy runs out.
    ///
    /// A failed status check keeps the previous handle and is retried on
    /// the next cycle.
    async fn poll_until_done<P>(
        &self,
        mut operation: Operation,
        on_progress: &mut P,
        cancel: &CancellationToken,
    ) -> Result<Operation, GenerationError>
    where
        P: FnMut(&str) + Send,
    {
        let started = Instant::now();
        let mut attempts = 0u32;

        while !operation.done {
            if !self.policy.allows_another(attempts, started.elapsed()) {
                tracing::warn!(
                    operation = %operation.name,
                    attempts,
                    "Gave up waiting for video generation",
                );
                return Err(GenerationError::Timeout {
                    attempts,
                    waited_secs: started.elapsed().as_secs(),
                });
            }

            cancellable(cancel, tokio::time::sleep(self.policy.interval)).await?;
            attempts += 1;
            on_progress(&processing_message(self.policy.elapsed_at(attempts)));

            match cancellable(cancel, self.service.refresh(&operation)).await? {
                Ok(next) => operation = next,
                Err(e) => {
                    tracing::warn!(
                        operation = %operation.name,
                        attempt = attempts,
                        error = %e,
                        "Polling failed, retrying",
                    );
                }
            }
        }

        tracing::debug!(operation = %operation.name, attempts, "Operation done");
        Ok(operation)
    }
}

/// Await `fut` unless `cancel` fires first.
async fn cancellable<F>(cancel: &CancellationToken, fut: F) -> Result<F::Output, GenerationError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GenerationError::Cancelled),
        output = fut => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use framecast_veo::VeoApiError;

    use super::*;

    struct NeverCalled;

    #[async_trait]
    impl VideoService for NeverCalled {
        async fn submit(&self, _: &PredictVideoRequest) -> Result<Operation, VeoApiError> {
            unreachable!("submit")
        }
        async fn refresh(&self, _: &Operation) -> Result<Operation, VeoApiError> {
            unreachable!("refresh")
        }
        async fn fetch_asset(&self, _: &str) -> Result<Vec<u8>, VeoApiError> {
            unreachable!("fetch_asset")
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Arc::new(NeverCalled), BlobStore::new(), PollPolicy::default())
    }

    #[test]
    fn second_acquire_is_busy() {
        let orchestrator = orchestrator();
        let _flight = orchestrator.acquire().expect("first acquire");
        assert!(orchestrator.is_busy());
        assert!(matches!(orchestrator.acquire(), Err(GenerationError::Busy)));
    }

    #[test]
    fn dropping_flight_frees_slot() {
        let orchestrator = orchestrator();
        drop(orchestrator.acquire().unwrap());
        assert!(!orchestrator.is_busy());
        assert!(orchestrator.acquire().is_ok());
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_any_call() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = cancellable(&cancel, async { 7 }).await;
        assert!(matches!(result, Err(GenerationError::Cancelled)));
    }

    #[tokio::test]
    async fn live_token_passes_output_through() {
        let cancel = CancellationToken::new();
        let result = cancellable(&cancel, async { 7 }).await;
        assert_eq!(result.unwrap(), 7);
    }
}

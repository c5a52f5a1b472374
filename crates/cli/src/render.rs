//! Terminal rendering of the generation state.

use framecast_core::generation::{GenerationState, VideoAsset};
use tokio::sync::watch;

/// One status line for `state`.
pub fn describe(state: &GenerationState) -> String {
    match state {
        GenerationState::Idle => "Ready.".to_string(),
        GenerationState::Loading { progress } => progress.clone(),
        GenerationState::Success { video } => format!(
            "Video ready ({}, {} bytes) at {}",
            video.mime_type(),
            video.size_bytes(),
            video.blob().url(),
        ),
        GenerationState::Error { detail } => detail.clone(),
        GenerationState::Cancelled => "Generation cancelled.".to_string(),
    }
}

/// The video of a successful run, or the run's failure as an error.
///
/// Error details are passed through unchanged so they are reported once.
pub fn finished_video(state: &GenerationState) -> anyhow::Result<&VideoAsset> {
    match state {
        GenerationState::Success { video } => Ok(video),
        GenerationState::Cancelled => anyhow::bail!("Video generation cancelled"),
        GenerationState::Error { detail } => anyhow::bail!(detail.clone()),
        other => anyhow::bail!("Generation ended in unexpected state: {}", other.status()),
    }
}

/// Print every progress message until the controller goes away.
///
/// Only `Loading` states are printed here; the caller reports the
/// terminal state itself.
pub async fn follow(mut rx: watch::Receiver<GenerationState>) {
    let mut last: Option<String> = None;
    while rx.changed().await.is_ok() {
        let line = match &*rx.borrow_and_update() {
            state @ GenerationState::Loading { .. } => describe(state),
            _ => continue,
        };
        if last.as_deref() != Some(line.as_str()) {
            eprintln!("{line}");
            last = Some(line);
        }
    }
}

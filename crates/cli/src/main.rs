//! `framecast` -- generate a short video from reference frames.
//!
//! ```text
//! framecast --prompt "a paper boat drifting" shot1.png shot2.png -o boat.mp4
//! ```
//!
//! The first frame (after `--reference`, if given) conditions the video.
//! Ctrl-C cancels a running generation.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                                            |
//! |--------------------------------|----------|----------------------------------------------------|
//! | `GEMINI_API_KEY` / `API_KEY`   | yes      | --                                                 |
//! | `GEMINI_API_BASE_URL`          | no       | `https://generativelanguage.googleapis.com/v1beta` |
//! | `VEO_MODEL`                    | no       | `veo-2.0-generate-001`                             |
//! | `GEMINI_REQUEST_TIMEOUT_SECS`  | no       | `60`                                               |
//! | `FRAMECAST_POLL_INTERVAL_SECS` | no       | `10`                                               |
//! | `FRAMECAST_POLL_MAX_ATTEMPTS`  | no       | `180`                                              |
//! | `FRAMECAST_POLL_DEADLINE_SECS` | no       | `1800` (`0` disables)                              |
//! | `RUST_LOG`                     | no       | `framecast=info`                                   |

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use framecast_cli::args::Args;
use framecast_cli::render;
use framecast_core::blob::BlobStore;
use framecast_core::frames::{FileHandle, FrameCollection};
use framecast_pipeline::{GenerationController, Orchestrator, PollPolicy};
use framecast_veo::{VeoApi, VeoConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framecast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = VeoConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid Gemini API configuration");
        std::process::exit(1);
    });
    let policy = PollPolicy::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid polling configuration");
        std::process::exit(1);
    });

    let api = VeoApi::new(config).context("Failed to build Gemini API client")?;

    tracing::info!(
        model = %api.model(),
        frames = args.frames.len(),
        poll_interval_secs = policy.interval.as_secs(),
        max_attempts = policy.max_attempts,
        "Starting framecast",
    );

    let blobs = BlobStore::new();
    let mut frames = FrameCollection::new(blobs.clone());
    frames.add(args.frames.iter().map(FileHandle::from_path));
    if !args.apply_reference(&mut frames) {
        anyhow::bail!(
            "--reference must be between 1 and {}",
            frames.len()
        );
    }

    let controller =
        GenerationController::new(Orchestrator::new(Arc::new(api), blobs.clone(), policy));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, cancelling generation");
                cancel.cancel();
            }
        });
    }
    let renderer = tokio::spawn(render::follow(controller.subscribe()));

    let state = controller
        .generate(&args.prompt, &frames, args.include_sound(), &cancel)
        .await?;
    drop(controller);
    renderer.await.context("Progress renderer panicked")?;

    let video = render::finished_video(&state)?;
    eprintln!("{}", render::describe(&state));

    let bytes = blobs
        .read(video.blob().url())
        .await
        .context("Generated video is no longer available")?;
    tokio::fs::write(&args.output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!(
        path = %args.output.display(),
        size_bytes = video.size_bytes(),
        "Video written",
    );
    Ok(())
}

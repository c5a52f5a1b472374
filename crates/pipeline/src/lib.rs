//! Video generation pipeline.
//!
//! Turns a validated [`GenerationRequest`](framecast_core::generation::GenerationRequest)
//! into a downloaded video:
//!
//! - [`encode`] -- reference frame to inline base64 image.
//! - [`poll`] -- bounded polling policy for the long-running operation.
//! - [`orchestrator::Orchestrator`] -- submit, poll, fetch; single-flight
//!   and cancellable.
//! - [`controller::GenerationController`] -- drives the generation state
//!   machine from orchestrator progress and publishes it to observers.

pub mod controller;
pub mod encode;
pub mod error;
pub mod orchestrator;
pub mod poll;

pub use controller::GenerationController;
pub use error::GenerationError;
pub use orchestrator::Orchestrator;
pub use poll::PollPolicy;

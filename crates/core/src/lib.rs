//! Framecast domain layer.
//!
//! Pure, I/O-light building blocks shared by the orchestration pipeline
//! and the front-end:
//!
//! - [`frames::FrameCollection`] -- ordered, drag-reorderable list of
//!   reference frames with stable identity.
//! - [`generation::GenerationState`] -- the lifecycle of a single video
//!   generation request.
//! - [`blob::BlobStore`] -- session-scoped `blob:` references for frame
//!   previews and downloaded videos.

pub mod blob;
pub mod error;
pub mod frames;
pub mod generation;
pub mod types;

//! Gemini API client for Veo long-running video generation.
//!
//! Provides typed request/operation messages, a REST client built on
//! [`reqwest`], environment-driven configuration, and the
//! [`VideoService`](service::VideoService) trait that the orchestration
//! pipeline depends on.

pub mod api;
pub mod config;
pub mod messages;
pub mod service;

pub use api::{VeoApi, VeoApiError};
pub use config::{ConfigError, VeoConfig};
pub use service::VideoService;

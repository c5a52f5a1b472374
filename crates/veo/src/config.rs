use std::fmt;
use std::time::Duration;

/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Veo model used for image-to-video generation.
pub const DEFAULT_MODEL: &str = "veo-2.0-generate-001";
/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Gemini client configuration loaded from environment variables.
///
/// The API key is the only required setting; its absence is a fatal
/// startup condition.
#[derive(Clone)]
pub struct VeoConfig {
    /// Static access credential, sent on every call.
    pub api_key: String,
    /// REST base URL without a trailing slash.
    pub base_url: String,
    /// Model id, e.g. `veo-2.0-generate-001`.
    pub model: String,
    /// Timeout applied to each HTTP request (submit, poll, download).
    pub request_timeout: Duration,
}

/// Errors raised while loading [`VeoConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) environment variable is not set")]
    MissingApiKey,

    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl VeoConfig {
    /// Configuration with default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                            |
    /// |--------------------------------|----------------------------------------------------|
    /// | `GEMINI_API_KEY` / `API_KEY`   | required                                           |
    /// | `GEMINI_API_BASE_URL`          | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `VEO_MODEL`                    | `veo-2.0-generate-001`                             |
    /// | `GEMINI_REQUEST_TIMEOUT_SECS`  | `60` (must be > 0)                                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading from an arbitrary
    /// lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|key| !key.trim().is_empty());
        let api_key = non_blank("GEMINI_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key.trim());

        if let Some(url) = lookup("GEMINI_API_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("VEO_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("GEMINI_REQUEST_TIMEOUT_SECS") {
            let secs = match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "GEMINI_REQUEST_TIMEOUT_SECS",
                        value: raw,
                        expected: "a positive whole number of seconds",
                    })
                }
            };
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

// The key must never reach logs.
impl fmt::Debug for VeoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VeoConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

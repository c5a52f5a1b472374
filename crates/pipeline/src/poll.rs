//! Polling policy for long-running generation operations.
//!
//! The orchestrator waits [`PollPolicy::interval`] between status checks
//! and gives up once either [`PollPolicy::max_attempts`] checks have been
//! made or [`PollPolicy::deadline`] has elapsed since submission.

use std::time::Duration;

use framecast_veo::ConfigError;

/// Default wait between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default cap on status checks (30 minutes at the default interval).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 180;
/// Default wall-clock budget measured from submission.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30 * 60);

/// Tunable bounds for the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status check.
    pub interval: Duration,
    /// Maximum number of status checks.
    pub max_attempts: u32,
    /// Optional wall-clock limit; `None` relies on `max_attempts` alone.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            deadline: Some(DEFAULT_DEADLINE),
        }
    }
}

impl PollPolicy {
    /// Load the policy from environment variables with defaults.
    ///
    /// | Env Var                        | Default | Notes              |
    /// |--------------------------------|---------|--------------------|
    /// | `FRAMECAST_POLL_INTERVAL_SECS` | `10`    | must be > 0        |
    /// | `FRAMECAST_POLL_MAX_ATTEMPTS`  | `180`   | must be > 0        |
    /// | `FRAMECAST_POLL_DEADLINE_SECS` | `1800`  | `0` disables it    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut policy = Self::default();

        if let Some(secs) = parse_positive(&lookup, "FRAMECAST_POLL_INTERVAL_SECS")? {
            policy.interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_positive(&lookup, "FRAMECAST_POLL_MAX_ATTEMPTS")? {
            policy.max_attempts = u32::try_from(attempts).map_err(|_| ConfigError::Invalid {
                var: "FRAMECAST_POLL_MAX_ATTEMPTS",
                value: attempts.to_string(),
                expected: "a positive 32-bit integer",
            })?;
        }
        if let Some(raw) = lookup("FRAMECAST_POLL_DEADLINE_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                var: "FRAMECAST_POLL_DEADLINE_SECS",
                value: raw.clone(),
                expected: "a whole number of seconds",
            })?;
            policy.deadline = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(policy)
    }

    /// Time reported as elapsed at the given (1-based) attempt.
    pub fn elapsed_at(&self, attempt: u32) -> Duration {
        self.interval.saturating_mul(attempt)
    }

    /// Whether another status check is allowed.
    ///
    /// `attempts` is the number of checks already made, `waited` the time
    /// since submission.
    pub fn allows_another(&self, attempts: u32, waited: Duration) -> bool {
        attempts < self.max_attempts && self.deadline.map_or(true, |deadline| waited < deadline)
    }
}

/// Progress text shown while waiting on the remote operation.
pub fn processing_message(elapsed: Duration) -> String {
    format!("Processing... ({}s)", elapsed.as_secs())
}

fn parse_positive<F>(lookup: &F, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw,
            expected: "a positive whole number",
        }),
    }
}

use framecast_core::generation::FAILURE_PREFIX;
use framecast_veo::VeoApiError;

/// Why a generation did not produce a video.
///
/// Transient poll failures are absent on purpose: they are logged and
/// retried inside the poll loop and never reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Prompt or frames missing. Never reaches the remote service.
    #[error("{0}")]
    Validation(String),

    /// Another generation is still in flight.
    #[error("A video generation is already in progress")]
    Busy,

    #[error("Could not read reference image '{name}': {source}")]
    Encoding {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not start video generation: {0}")]
    Submission(#[source] VeoApiError),

    /// The operation finished with an error status.
    #[error("Video generation failed remotely (code {code}): {message}")]
    OperationFailed { code: i32, message: String },

    /// The operation finished without a downloadable video.
    #[error(
        "Video generation completed but no download link was found.{}",
        filtered_suffix(.filtered_reasons)
    )]
    MissingResult { filtered_reasons: Vec<String> },

    #[error("Video generation did not finish after {attempts} status checks ({waited_secs}s)")]
    Timeout { attempts: u32, waited_secs: u64 },

    #[error("Could not download the generated video: {0}")]
    Download(#[source] VeoApiError),

    #[error("Video generation was cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Text shown to the user in the error state.
    ///
    /// Validation messages are shown verbatim; everything else is
    /// prefixed with [`FAILURE_PREFIX`].
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(message) => message.clone(),
            other => format!("{FAILURE_PREFIX}{other}"),
        }
    }
}

fn filtered_suffix(reasons: &[String]) -> String {
    if reasons.is_empty() {
        String::new()
    } else {
        format!(" Filtered by the service: {}", reasons.join("; "))
    }
}

use crate::generation::GenerationStatus;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid transition: cannot {action} while {from}")]
    InvalidTransition {
        from: GenerationStatus,
        action: &'static str,
    },
}

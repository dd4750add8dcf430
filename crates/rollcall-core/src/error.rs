use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown attendance status: {0}")]
    UnknownStatus(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

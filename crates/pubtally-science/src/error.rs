use pubtally_core::{ErrorKind, ExitCode, PubtallyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScienceError {
    #[error(transparent)]
    Core(#[from] PubtallyError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    ApiError(String, String),

    #[error("rate limited by {0}")]
    RateLimit(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl ScienceError {
    /// Classification used by callers to render the failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScienceError::Core(e) => e.kind(),
            _ => ErrorKind::Internal,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            ScienceError::Http(_) | ScienceError::ApiError(..) | ScienceError::RateLimit(_) => {
                ExitCode::NetworkError
            }
            other => other.kind().into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScienceError>;

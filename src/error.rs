//! Error handling for GenStudio
//!
//! One variant per failure phase so callers can always tell whether a
//! workflow died at submission, while polling, while fetching the
//! artifact, or while encoding audio locally.

use thiserror::Error;

/// Result type alias for GenStudio operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Main error type for GenStudio operations
#[derive(Error, Debug)]
pub enum StudioError {
    // Workflow phase errors
    #[error("Submission rejected: {reason}")]
    Submission { reason: String },

    #[error("Status poll failed: {reason}")]
    Poll { reason: String },

    #[error("Artifact fetch failed: {reason}")]
    Fetch { reason: String },

    #[error("Generation failed on the remote service: {reason}")]
    JobFailed { reason: String },

    #[error("Workflow cancelled before completion")]
    Cancelled,

    // Audio encoding errors
    #[error("Invalid audio format: {reason}")]
    InvalidAudioFormat { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StudioError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StudioError::Submission { .. } => "SUBMISSION_ERROR",
            StudioError::Poll { .. } => "POLL_ERROR",
            StudioError::Fetch { .. } => "FETCH_ERROR",
            StudioError::JobFailed { .. } => "JOB_FAILED",
            StudioError::Cancelled => "CANCELLED",
            StudioError::InvalidAudioFormat { .. } => "INVALID_AUDIO_FORMAT",
            StudioError::Io(_) => "IO_ERROR",
            StudioError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Which workflow phase produced this error
    pub fn phase(&self) -> &'static str {
        match self {
            StudioError::Submission { .. } => "submission",
            StudioError::Poll { .. } => "polling",
            StudioError::Fetch { .. } => "fetch",
            StudioError::JobFailed { .. } => "generation",
            StudioError::Cancelled => "cancellation",
            StudioError::InvalidAudioFormat { .. } => "encoding",
            StudioError::Io(_) | StudioError::Serialization(_) => "local",
        }
    }

    /// Check if resubmitting the whole workflow can recover from this error
    ///
    /// Nothing is retried internally; a multi-minute remote job retried
    /// halfway through risks duplicate billing on the remote side. The
    /// caller owns the resubmit decision.
    pub fn is_recoverable(&self) -> bool {
        match self {
            StudioError::Submission { .. } => true,
            StudioError::Poll { .. } => true,
            StudioError::Fetch { .. } => true,
            StudioError::JobFailed { .. } => true,
            StudioError::InvalidAudioFormat { .. } => true,
            StudioError::Cancelled => false,
            StudioError::Io(_) | StudioError::Serialization(_) => false,
        }
    }
}

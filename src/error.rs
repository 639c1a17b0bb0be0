//! Error types shared by the repair pipeline.

use std::path::PathBuf;

/// Errors produced by the diagnosis, patching and verification stages.
#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No code provided.")]
    EmptyInput,

    #[error("Could not find valid JSON in AI response.")]
    NoFixList { raw: String },

    #[error("Fix list is not valid: {0}")]
    MalformedFixList(String),

    #[error("Could not find a valid stack trace in the logs.")]
    NoTraceFound,

    #[error("GEMINI_KEY environment variable is not set. Please set it in your terminal.")]
    MissingApiKey,

    #[error("API Error: {status} -> {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Result type for pipeline operations.
pub type DoctorResult<T> = std::result::Result<T, DoctorError>;

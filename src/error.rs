use thiserror::Error;

/// Reasons an import refuses to start or cannot read its input.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{issues} validation issue(s) must be fixed before importing")]
    ValidationFailed { issues: usize },
    #[error("Auth token missing")]
    MissingAuthToken,
    #[error("User id missing")]
    MissingUserId,
    #[error("API base URL missing")]
    MissingApiUrl,
    #[error("No rows found in input")]
    EmptyInput,
    #[error("Could not read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Connection failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Request rejected: {message}")]
    Rejected { message: String },
    #[error("Invalid response: {0}")]
    Decode(String),
}

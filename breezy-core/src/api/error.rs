use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the server. Nothing here is retried; callers report
/// the error and carry on.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, reset, ...)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The server answered with `{"status": "error", "message": ...}`
    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("failed to read prompt audio: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(source: serde_json::Error) -> Self {
        Self::Decode(source.to_string())
    }
}

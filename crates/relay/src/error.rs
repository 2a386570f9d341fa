use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Backend relay failures. These never escape the relay's public API
/// (callers only ever see "no reply") but the variants keep log lines
/// precise about what went wrong.
#[derive(Debug, Error)]
pub enum Error {
    /// Connect failure, timeout, or any other transport-level error.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("backend returned status {status}")]
    Status { status: reqwest::StatusCode },

    /// Backend answered 2xx with a body that is not valid JSON.
    #[error("malformed backend response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The audio file to upload could not be read.
    #[error("failed to read audio file: {0}")]
    Io(#[from] std::io::Error),
}

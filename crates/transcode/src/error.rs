use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Transcoding failures. Every variant that fires after the input file was
/// written is preceded by removal of both temp files.
#[derive(Debug, Error)]
pub enum Error {
    /// ffmpeg is neither at the configured path nor in PATH.
    #[error("ffmpeg binary not found (configure FFMPEG_PATH or install ffmpeg)")]
    BinaryNotFound,

    /// The media payload was not valid base64.
    #[error("invalid base64 audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Scratch-dir or temp-file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// ffmpeg exited non-zero or could not be spawned.
    #[error("transcode pipeline failed for job {job_id}: {detail}")]
    Pipeline { job_id: String, detail: String },

    /// ffmpeg did not finish within the configured timeout.
    #[error("transcode timed out for job {job_id} after {seconds}s")]
    Timeout { job_id: String, seconds: u64 },
}

use std::error::Error as StdError;

/// Crate-wide result type for chat client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared across the chat client seam.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The chat client is not connected/paired yet.
    #[error("chat client unavailable: {message}")]
    Unavailable { message: String },

    /// Media was expected but could not be fetched.
    #[error("media download failed: {message}")]
    MediaDownload { message: String },

    /// Wrapped source error from the underlying transport.
    #[error("chat operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn media_download(message: impl std::fmt::Display) -> Self {
        Self::MediaDownload {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Longscribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Longscribe's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Every variant except [`Error::Formatting`] is fatal to a pipeline run. Formatting failures
/// are recovered inside the scheduler and only surface through logs.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid chunking or concurrency parameters. Raised before any work is attempted.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The media tool could not determine the duration of the source audio.
    #[error("failed to probe duration of '{}': {source}", path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The media tool failed to materialize one chunk.
    #[error("failed to split chunk {index}: {source}")]
    Split {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// The recognition call for one chunk failed. The whole run is discarded.
    #[error("transcription of chunk {index} failed: {source}")]
    Transcription {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// The optional readability pass failed.
    #[error("formatting failed: {0}")]
    Formatting(String),

    /// A remote service answered with an error status or an unreadable body.
    #[error("remote service error: {0}")]
    Service(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub(crate) fn transcription(index: usize, source: Error) -> Self {
        Self::Transcription {
            index,
            source: Box::new(source),
        }
    }

    /// Whether this error aborts a pipeline run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Formatting(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(feature = "openai")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Service(err.to_string())
    }
}

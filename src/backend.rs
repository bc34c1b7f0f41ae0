use async_trait::async_trait;

use crate::Result;
use crate::segments::TranscriptSegment;

/// What the recognition service should return for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionMode {
    /// Recognized text only.
    Text,

    /// Recognized text plus time-aligned segments.
    Segments,
}

/// One recognition call for one chunk artifact.
#[derive(Debug, Clone)]
pub struct RecognitionRequest<'a> {
    /// Raw bytes of the chunk artifact.
    pub audio: Vec<u8>,

    /// File name of the artifact. Services use the extension to pick a decoder.
    pub file_name: &'a str,

    /// Language code, or `None` for auto-detection.
    pub language: Option<&'a str>,

    /// Disambiguation prompt for an explicit language.
    pub prompt: Option<&'a str>,

    pub mode: RecognitionMode,
}

/// Result of a recognition call, in chunk-local time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
}

/// Pluggable speech-recognition service used by [`crate::Transcriber`].
///
/// Timeouts belong to the implementation's own client configuration; the pipeline imposes
/// none.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, request: RecognitionRequest<'_>) -> Result<Recognition>;
}

/// Readability pass over a chunk's raw text.
///
/// Implementations add punctuation and capitalization without changing wording or language.
/// Failures are recovered by the caller, which keeps the raw text.
#[async_trait]
pub trait Formatter: Send + Sync {
    async fn format(&self, text: &str, language: Option<&str>) -> Result<String>;
}

/// Formatter that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

#[async_trait]
impl Formatter for Passthrough {
    async fn format(&self, text: &str, _language: Option<&str>) -> Result<String> {
        Ok(text.to_owned())
    }
}

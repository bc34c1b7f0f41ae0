use serde::{Deserialize, Serialize};

/// A time-aligned piece of recognized speech, in chunk-local seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl TranscriptSegment {
    /// The same segment moved by `offset_seconds`.
    pub fn shifted(&self, offset_seconds: f64) -> Self {
        Self {
            start_seconds: self.start_seconds + offset_seconds,
            end_seconds: self.end_seconds + offset_seconds,
            text: self.text.clone(),
        }
    }
}

/// Output of one successfully transcribed chunk.
///
/// `segments` is empty unless subtitles were requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkResult {
    pub index: usize,
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
}

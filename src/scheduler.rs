//! Bounded-concurrency dispatch of recognition requests.
//!
//! Requests are submitted in ascending chunk order with at most `max_in_flight` outstanding.
//! Everything runs on the calling task: completions are drained one at a time, so the
//! completion tally and the result list have a single owner and need no locking.
//!
//! The first failed recognition call returns immediately. Requests still in flight are
//! dropped with the stream and their results never observed.

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, warn};

use crate::backend::{Formatter, RecognitionMode, RecognitionRequest, Recognizer};
use crate::language::RequestLanguage;
use crate::segments::ChunkResult;
use crate::splitter::ChunkArtifact;
use crate::{Error, Result};

/// Completion tally reported after each finished chunk.
///
/// `completed` counts finished chunks (1, 2, … `total`); it says nothing about which chunk
/// finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Per-run request settings shared by every chunk.
#[derive(Debug, Clone)]
pub struct ScheduleOpts {
    pub language: RequestLanguage,
    pub mode: RecognitionMode,
    pub max_in_flight: usize,
}

/// Transcribe every artifact and collect results in completion order.
///
/// Callers must not rely on the order of the returned results.
pub async fn transcribe_all<R, F, P>(
    recognizer: &R,
    formatter: &F,
    artifacts: &[ChunkArtifact],
    opts: &ScheduleOpts,
    mut on_progress: P,
) -> Result<Vec<ChunkResult>>
where
    R: Recognizer + ?Sized,
    F: Formatter + ?Sized,
    P: FnMut(Progress),
{
    if opts.max_in_flight == 0 {
        return Err(Error::config("at least one request must be allowed in flight"));
    }

    let total = artifacts.len();
    let mut pending = stream::iter(artifacts)
        .map(|artifact| transcribe_chunk(recognizer, formatter, artifact, opts))
        .buffer_unordered(opts.max_in_flight);

    let mut results = Vec::with_capacity(total);
    let mut completed = 0;
    while let Some(result) = pending.next().await {
        let result = result?;
        completed += 1;
        debug!(index = result.index, completed, total, "chunk transcribed");
        on_progress(Progress { completed, total });
        results.push(result);
    }

    Ok(results)
}

async fn transcribe_chunk<R, F>(
    recognizer: &R,
    formatter: &F,
    artifact: &ChunkArtifact,
    opts: &ScheduleOpts,
) -> Result<ChunkResult>
where
    R: Recognizer + ?Sized,
    F: Formatter + ?Sized,
{
    let index = artifact.descriptor.index;
    let audio = tokio::fs::read(&artifact.path)
        .await
        .map_err(|err| Error::transcription(index, err.into()))?;

    let file_name = artifact.file_name();
    let language = opts.language.language.as_deref();
    let request = RecognitionRequest {
        audio,
        file_name: &file_name,
        language,
        prompt: opts.language.prompt.as_deref(),
        mode: opts.mode,
    };
    let recognition = recognizer
        .recognize(request)
        .await
        .map_err(|err| Error::transcription(index, err))?;

    match opts.mode {
        // Subtitles keep the service's exact wording so text and timing stay aligned.
        RecognitionMode::Segments => Ok(ChunkResult {
            index,
            text: recognition.text,
            segments: recognition.segments,
        }),
        RecognitionMode::Text => {
            let text = format_or_raw(formatter, index, recognition.text, language).await;
            Ok(ChunkResult {
                index,
                text,
                segments: Vec::new(),
            })
        }
    }
}

async fn format_or_raw<F: Formatter + ?Sized>(
    formatter: &F,
    index: usize,
    raw: String,
    language: Option<&str>,
) -> String {
    if raw.trim().is_empty() {
        return raw;
    }

    match formatter.format(&raw, language).await {
        Ok(formatted) if !formatted.trim().is_empty() => formatted,
        Ok(_) => {
            warn!(index, "formatter returned empty text, keeping raw transcript");
            raw
        }
        Err(err) => {
            warn!(index, error = %err, "formatting failed, keeping raw transcript");
            raw
        }
    }
}

//! High-level API for running a chunked transcription.
//!
//! We expose a single entry point (`Transcriber`) that wires up
//! probe → plan → split → bounded dispatch → ordered assembly, all inside one scoped
//! workspace, while keeping each stage testable in its own module.
//!
//! The intent is:
//! - Construct once with a media tool, a recognizer, and optionally a formatter.
//! - Call `transcribe` many times; runs share nothing but those handles.
//! - Callers choose chunking, concurrency, language and output via `Opts`.

use std::path::Path;

use tracing::{Instrument, info, info_span, warn};

use crate::assembler::{PipelineOutput, assemble};
use crate::backend::{Formatter, Passthrough, RecognitionMode, Recognizer};
use crate::media::{MediaTool, probe_duration};
use crate::opts::Opts;
use crate::planner::plan;
use crate::scheduler::{Progress, ScheduleOpts, transcribe_all};
use crate::splitter::split_all;
use crate::workspace::Workspace;
use crate::Result;

/// The main high-level transcription entry point.
///
/// `Transcriber` owns the handles to the external collaborators:
/// - a [`MediaTool`] for probing and splitting
/// - a [`Recognizer`] for speech recognition
/// - a [`Formatter`] for the readability pass on text-only runs
///
/// No state survives between runs.
pub struct Transcriber<M, R, F = Passthrough> {
    media: M,
    recognizer: R,
    formatter: F,
}

impl<M: MediaTool, R: Recognizer> Transcriber<M, R, Passthrough> {
    /// Create a transcriber without a readability pass.
    pub fn new(media: M, recognizer: R) -> Self {
        Self {
            media,
            recognizer,
            formatter: Passthrough,
        }
    }
}

impl<M: MediaTool, R: Recognizer, F: Formatter> Transcriber<M, R, F> {
    /// Replace the readability formatter used on text-only runs.
    pub fn with_formatter<G: Formatter>(self, formatter: G) -> Transcriber<M, R, G> {
        Transcriber {
            media: self.media,
            recognizer: self.recognizer,
            formatter,
        }
    }

    /// Transcribe `source` without progress reporting.
    pub async fn transcribe(&self, source: &Path, opts: &Opts) -> Result<PipelineOutput> {
        self.transcribe_with_progress(source, opts, |_| {}).await
    }

    /// Transcribe `source`, calling `on_progress` after each chunk completes.
    ///
    /// Any fatal error discards all completed chunk work. The workspace is removed before this
    /// returns, on every path.
    pub async fn transcribe_with_progress<P>(
        &self,
        source: &Path,
        opts: &Opts,
        on_progress: P,
    ) -> Result<PipelineOutput>
    where
        P: FnMut(Progress),
    {
        // Bad parameters fail before anything touches the filesystem.
        opts.validate()?;

        let workspace = match &opts.workspace_root {
            Some(root) => Workspace::create_in(root)?,
            None => Workspace::create()?,
        };

        let span = info_span!("transcribe", source = %source.display());
        let run_res = self
            .run(source, opts, &workspace, on_progress)
            .instrument(span)
            .await;

        merge_run_and_close(run_res, workspace.close())
    }

    async fn run<P>(
        &self,
        source: &Path,
        opts: &Opts,
        workspace: &Workspace,
        on_progress: P,
    ) -> Result<PipelineOutput>
    where
        P: FnMut(Progress),
    {
        let total_seconds = probe_duration(&self.media, source).await?;
        let chunks = plan(total_seconds, opts.chunk_seconds)?;
        info!(chunks = chunks.len(), chunk_seconds = opts.chunk_seconds, "planned chunks");

        let artifacts = split_all(&self.media, source, &chunks, workspace).await?;

        let schedule = ScheduleOpts {
            language: opts.language.request(),
            mode: if opts.output_type.wants_subtitles() {
                RecognitionMode::Segments
            } else {
                RecognitionMode::Text
            },
            max_in_flight: opts.max_concurrency,
        };
        let results = transcribe_all(
            &self.recognizer,
            &self.formatter,
            &artifacts,
            &schedule,
            on_progress,
        )
        .await?;

        let output = assemble(results, &chunks, opts.output_type)?;
        info!(chars = output.text.len(), "transcription complete");
        Ok(output)
    }

    /// Access the configured media tool.
    pub fn media(&self) -> &M {
        &self.media
    }

    /// Access the configured recognizer.
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }
}

/// The run's own error wins; a cleanup failure after a successful run is only logged.
fn merge_run_and_close(
    run_res: Result<PipelineOutput>,
    close_res: Result<()>,
) -> Result<PipelineOutput> {
    match (run_res, close_res) {
        (Ok(output), Ok(())) => Ok(output),
        (Ok(output), Err(close_err)) => {
            warn!(error = %close_err, "transcript complete but workspace cleanup failed");
            Ok(output)
        }
        (Err(err), _) => Err(err),
    }
}

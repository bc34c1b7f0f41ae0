use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;
use tracing::level_filters::LevelFilter;

use longscribe::backends::openai::{OpenAiClient, OpenAiConfig};
use longscribe::opts::{DEFAULT_CHUNK_SECONDS, DEFAULT_MAX_CONCURRENCY};
use longscribe::{Ffmpeg, Language, Opts, OutputType, PipelineOutput, Progress, Transcriber};

#[tokio::main]
async fn main() {
    let params = Params::parse();
    if params.verbose {
        longscribe::logging::init_with_default(LevelFilter::INFO);
    } else {
        longscribe::init_logging();
    }

    if let Err(err) = run(params).await {
        error!(error = ?err, "longscribe-cli failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "longscribe")]
#[command(about = "Transcribe long recordings in parallel chunks")]
struct Params {
    /// Audio file to transcribe.
    #[arg(short = 'a', long = "audio")]
    audio_path: PathBuf,

    /// Write the result here instead of stdout.
    #[arg(short = 'o', long = "output")]
    output_path: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Text
    )]
    output_type: OutputType,

    /// Language code, or `auto` to let the service detect it.
    #[arg(short = 'l', long = "language", default_value = "auto")]
    language: Language,

    /// Chunk length in seconds.
    #[arg(long = "chunk-seconds", default_value_t = DEFAULT_CHUNK_SECONDS)]
    chunk_seconds: f64,

    /// Maximum recognition requests in flight.
    #[arg(short = 'j', long = "concurrency", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    concurrency: usize,

    /// Skip the punctuation/capitalization pass on text output.
    #[arg(long = "no-formatting", default_value_t = false)]
    no_formatting: bool,

    /// Also write a short summary of the transcript to this file.
    #[arg(long = "summary")]
    summary_path: Option<PathBuf>,

    /// Log progress at `info` unless `LONGSCRIBE_LOG` is set.
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,

    /// ffmpeg binary.
    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// ffprobe binary.
    #[arg(long = "ffprobe", default_value = "ffprobe")]
    ffprobe: PathBuf,
}

async fn run(params: Params) -> Result<()> {

    let config = OpenAiConfig::from_env().context("failed to load service configuration")?;
    let client = OpenAiClient::new(config).context("failed to build HTTP client")?;
    let media = Ffmpeg {
        ffmpeg: params.ffmpeg.clone(),
        ffprobe: params.ffprobe.clone(),
    };

    let opts = Opts {
        chunk_seconds: params.chunk_seconds,
        max_concurrency: params.concurrency,
        language: params.language.clone(),
        output_type: params.output_type,
        workspace_root: None,
    };

    let bar = progress_bar();
    let on_progress = |p: Progress| {
        bar.set_length(p.total as u64);
        bar.set_position(p.completed as u64);
    };

    let output = if params.no_formatting {
        Transcriber::new(media, client.clone())
            .transcribe_with_progress(&params.audio_path, &opts, on_progress)
            .await
    } else {
        Transcriber::new(media, client.clone())
            .with_formatter(client.clone())
            .transcribe_with_progress(&params.audio_path, &opts, on_progress)
            .await
    };
    let output = match output {
        Ok(output) => {
            bar.finish_and_clear();
            output
        }
        Err(err) => {
            bar.abandon();
            return Err(err).with_context(|| {
                format!("failed to transcribe '{}'", params.audio_path.display())
            });
        }
    };

    let language = params.language.code();
    let client = &client;
    write_results(
        &output,
        params.output_path.as_deref(),
        params.summary_path.as_deref(),
        |text| async move { client.summarize(&text, language).await },
    )
    .await
}

/// Write the transcript and, when requested, its summary.
///
/// The summary is produced before anything touches disk, so a failed summary leaves no
/// partial results behind and the exit status matches what was written.
async fn write_results<S, Fut>(
    output: &PipelineOutput,
    output_path: Option<&Path>,
    summary_path: Option<&Path>,
    summarize: S,
) -> Result<()>
where
    S: FnOnce(String) -> Fut,
    Fut: Future<Output = longscribe::Result<String>>,
{
    let summary = match summary_path {
        Some(path) => {
            let summary = summarize(output.text.clone())
                .await
                .context("failed to summarize transcript")?;
            Some((path, summary))
        }
        None => None,
    };

    write_output(output_path, rendered(output))?;

    if let Some((path, summary)) = summary {
        std::fs::write(path, summary)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    Ok(())
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} chunks")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn rendered(output: &PipelineOutput) -> &str {
    output.subtitles.as_deref().unwrap_or(&output.text)
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> PipelineOutput {
        PipelineOutput {
            text: "hello world".to_owned(),
            subtitles: None,
        }
    }

    #[tokio::test]
    async fn failed_summary_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let transcript = dir.path().join("out.txt");
        let summary = dir.path().join("summary.txt");

        let res = write_results(
            &output(),
            Some(transcript.as_path()),
            Some(summary.as_path()),
            |_| async { Err(longscribe::Error::Service("503 Service Unavailable".to_owned())) },
        )
        .await;

        assert!(res.is_err());
        assert!(!transcript.exists());
        assert!(!summary.exists());
        Ok(())
    }

    #[tokio::test]
    async fn summary_and_transcript_are_both_written() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let transcript = dir.path().join("out.txt");
        let summary = dir.path().join("summary.txt");

        write_results(
            &output(),
            Some(transcript.as_path()),
            Some(summary.as_path()),
            |text| async move { Ok(text.split_whitespace().next().unwrap_or_default().to_owned()) },
        )
        .await?;

        assert_eq!(std::fs::read_to_string(&transcript)?, "hello world");
        assert_eq!(std::fs::read_to_string(&summary)?, "hello");
        Ok(())
    }
}

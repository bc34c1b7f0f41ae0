//! External media tool seam: duration probing and time-range extraction.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::{Error, Result};

/// Media operations the pipeline delegates to an external tool.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Total duration of `source` in seconds.
    async fn probe_duration(&self, source: &Path) -> Result<f64>;

    /// Copy `[start_seconds, start_seconds + duration_seconds)` of `source` into `dest`
    /// without re-encoding.
    async fn extract(
        &self,
        source: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        dest: &Path,
    ) -> Result<()>;
}

/// `ffprobe` / `ffmpeg` invoked as subprocesses.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

#[async_trait]
impl MediaTool for Ffmpeg {
    async fn probe_duration(&self, source: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| spawn_error(&self.ffprobe, err))?;

        if !output.status.success() {
            return Err(exit_error(&self.ffprobe, output.status, &output.stderr));
        }

        let stdout = std::str::from_utf8(&output.stdout)
            .map_err(|_| Error::msg("non-utf8 output from ffprobe"))?;
        parse_duration(stdout)
    }

    async fn extract(
        &self,
        source: &Path,
        start_seconds: f64,
        duration_seconds: f64,
        dest: &Path,
    ) -> Result<()> {
        let output = Command::new(&self.ffmpeg)
            .arg("-nostdin")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-ss")
            .arg(format!("{start_seconds:.3}"))
            .arg("-t")
            .arg(format!("{duration_seconds:.3}"))
            .arg("-i")
            .arg(source)
            .arg("-vn")
            .arg("-c")
            .arg("copy")
            .arg(dest)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| spawn_error(&self.ffmpeg, err))?;

        if !output.status.success() {
            return Err(exit_error(&self.ffmpeg, output.status, &output.stderr));
        }
        Ok(())
    }
}

/// Probe `source`, wrapping any failure as [`Error::Probe`].
pub async fn probe_duration<M: MediaTool + ?Sized>(media: &M, source: &Path) -> Result<f64> {
    let seconds = media
        .probe_duration(source)
        .await
        .map_err(|err| Error::Probe {
            path: source.to_path_buf(),
            source: Box::new(err),
        })?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(Error::Probe {
            path: source.to_path_buf(),
            source: Box::new(Error::msg(format!("reported duration {seconds} is not positive"))),
        });
    }

    info!(source = %source.display(), seconds, "probed duration");
    Ok(seconds)
}

fn parse_duration(stdout: &str) -> Result<f64> {
    let raw = stdout.trim();
    raw.parse::<f64>()
        .map_err(|_| Error::msg(format!("unreadable duration from ffprobe: '{raw}'")))
}

fn spawn_error(program: &Path, err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        Error::msg(format!("'{}' not found on PATH", program.display()))
    } else {
        Error::msg(format!("failed to run '{}': {err}", program.display()))
    }
}

fn exit_error(program: &Path, status: std::process::ExitStatus, stderr: &[u8]) -> Error {
    let stderr = String::from_utf8_lossy(stderr);
    Error::msg(format!(
        "'{}' exited with {status}: {}",
        program.display(),
        stderr.trim()
    ))
}

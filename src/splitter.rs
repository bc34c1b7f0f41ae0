use std::path::{Path, PathBuf};

use tracing::debug;

use crate::media::MediaTool;
use crate::planner::ChunkDescriptor;
use crate::workspace::Workspace;
use crate::{Error, Result};

/// Container extension used when the source has none.
const FALLBACK_EXTENSION: &str = "mka";

/// A planned chunk materialized as a standalone audio file inside the workspace.
#[derive(Debug, Clone)]
pub struct ChunkArtifact {
    pub descriptor: ChunkDescriptor,
    pub path: PathBuf,
}

impl ChunkArtifact {
    /// File name sent alongside the audio bytes to the recognition service.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("chunk_{:05}", self.descriptor.index))
    }
}

/// Materialize every planned chunk, in order, before any transcription starts.
///
/// The first failure aborts with [`Error::Split`]. Artifacts created before the failure stay
/// in the workspace and go away with it.
pub async fn split_all<M: MediaTool + ?Sized>(
    media: &M,
    source: &Path,
    plan: &[ChunkDescriptor],
    workspace: &Workspace,
) -> Result<Vec<ChunkArtifact>> {
    // Stream copy keeps the codec, so the container has to match the source.
    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(FALLBACK_EXTENSION);

    let mut artifacts = Vec::with_capacity(plan.len());
    for descriptor in plan {
        let path = workspace.chunk_path(descriptor.index, extension);
        media
            .extract(
                source,
                descriptor.start_seconds,
                descriptor.duration_seconds,
                &path,
            )
            .await
            .map_err(|err| Error::Split {
                index: descriptor.index,
                source: Box::new(err),
            })?;

        debug!(
            index = descriptor.index,
            start = descriptor.start_seconds,
            duration = descriptor.duration_seconds,
            "split chunk"
        );
        artifacts.push(ChunkArtifact {
            descriptor: *descriptor,
            path,
        });
    }

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::planner::plan;

    #[derive(Default)]
    struct RecordingMedia {
        fail_at_start: Option<f64>,
        calls: Mutex<Vec<(f64, f64, PathBuf)>>,
    }

    #[async_trait]
    impl MediaTool for RecordingMedia {
        async fn probe_duration(&self, _source: &Path) -> Result<f64> {
            Ok(0.0)
        }

        async fn extract(
            &self,
            _source: &Path,
            start: f64,
            duration: f64,
            dest: &Path,
        ) -> Result<()> {
            if self.fail_at_start == Some(start) {
                return Err(Error::msg("boom"));
            }
            std::fs::write(dest, b"audio")?;
            self.calls
                .lock()
                .map_err(|_| Error::msg("poisoned"))?
                .push((start, duration, dest.to_path_buf()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn splits_every_chunk_in_order_with_source_extension() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let ws = Workspace::create_in(root.path())?;
        let media = RecordingMedia::default();
        let chunks = plan(650.0, 300.0)?;

        let artifacts = split_all(&media, Path::new("talk.m4a"), &chunks, &ws).await?;

        assert_eq!(artifacts.len(), 3);
        for (i, artifact) in artifacts.iter().enumerate() {
            assert_eq!(artifact.descriptor.index, i);
            assert!(artifact.path.starts_with(ws.path()));
            assert!(artifact.path.exists());
            assert_eq!(artifact.path.extension().and_then(|e| e.to_str()), Some("m4a"));
        }
        let calls = media.calls.lock().map_err(|_| anyhow::anyhow!("poisoned"))?;
        let ranges: Vec<(f64, f64)> = calls.iter().map(|(s, d, _)| (*s, *d)).collect();
        assert_eq!(ranges, vec![(0.0, 300.0), (300.0, 300.0), (600.0, 50.0)]);
        Ok(())
    }

    #[tokio::test]
    async fn failure_names_the_chunk() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let ws = Workspace::create_in(root.path())?;
        let media = RecordingMedia {
            fail_at_start: Some(300.0),
            ..RecordingMedia::default()
        };
        let chunks = plan(650.0, 300.0)?;

        let err = split_all(&media, Path::new("talk"), &chunks, &ws)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Split { index: 1, .. }));
        assert!(ws.chunk_path(0, FALLBACK_EXTENSION).exists());
        Ok(())
    }
}

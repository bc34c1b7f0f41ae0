use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Result;

/// Scoped working directory for one pipeline run.
///
/// The directory is created on construction and removed recursively when the workspace is
/// closed or dropped, so every exit path (success, fatal error, panic unwinding through the
/// run) leaves nothing behind. Names embed a v4 UUID so concurrent runs on one host never
/// collide.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn create() -> Result<Self> {
        Self::create_in(std::env::temp_dir())
    }

    /// Create a workspace under `root`.
    pub fn create_in(root: impl AsRef<Path>) -> Result<Self> {
        let prefix = format!("longscribe-{}-", Uuid::new_v4().simple());
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(root.as_ref())?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destination path for a chunk artifact.
    pub fn chunk_path(&self, index: usize, extension: &str) -> PathBuf {
        self.dir.path().join(format!("chunk_{index:05}.{extension}"))
    }

    /// Remove the workspace now and report failures.
    ///
    /// Dropping a `Workspace` also removes it, silently.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                debug!(path = %path.display(), "removed workspace");
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to remove workspace");
                Err(err.into())
            }
        }
    }
}

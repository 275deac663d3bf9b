//! Request-scoped temporary artifacts.
//!
//! Each request gets an input and an output path inside the configured
//! scratch directory. Paths carry a time component and a random UUID, so
//! concurrent requests never collide and no locking is needed. The store
//! guarantees nothing durable: every allocated path is released when the
//! request finishes, on every branch.

use crate::error::{HyphenError, ServerResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Which side of the transformation a temp path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Input,
    Output,
}

impl ArtifactRole {
    fn as_str(self) -> &'static str {
        match self {
            ArtifactRole::Input => "input",
            ArtifactRole::Output => "output",
        }
    }
}

/// Handle to the scratch directory. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    dir: PathBuf,
}

impl ScratchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Produce a collision-free path for one artifact. Allocation touches no
    /// files; a path only exists on disk once something is staged to it.
    pub fn allocate(&self, role: ArtifactRole) -> PathBuf {
        let name = format!(
            "epub-{}-{}-{}.epub",
            role.as_str(),
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4()
        );
        self.dir.join(name)
    }

    /// Write uploaded bytes to an allocated path.
    pub async fn stage(&self, path: &Path, bytes: &[u8]) -> ServerResult<()> {
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| HyphenError::StageWrite(e.to_string()))
    }

    /// Read back the bytes the tool produced. A missing or unreadable file
    /// means the tool did not deliver output.
    pub async fn retrieve(&self, path: &Path) -> ServerResult<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| HyphenError::RetrieveRead(e.to_string()))
    }

    /// Best-effort removal of every path in the set. A path that was never
    /// created (or is already gone) is not an error; anything else is logged
    /// and swallowed. Never raises to the caller.
    pub async fn release(&self, set: &TempArtifactSet) {
        for path in set.paths() {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "scratch_release_failed");
                }
            }
        }
    }
}

/// The temp paths allocated for one request: input first, output second.
#[derive(Debug)]
pub struct TempArtifactSet {
    input: PathBuf,
    output: PathBuf,
}

impl TempArtifactSet {
    pub fn allocate(store: &ScratchStore) -> Self {
        Self {
            input: store.allocate(ArtifactRole::Input),
            output: store.allocate(ArtifactRole::Output),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn paths(&self) -> [&Path; 2] {
        [&self.input, &self.output]
    }
}

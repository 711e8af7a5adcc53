use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use docvault_core::models::ExtractionStrategyKind;
use tempfile::TempDir;

/// Why a strategy produced no text
#[derive(Debug, thiserror::Error)]
pub enum Diagnostic {
    #[error("{tool} could not be started: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    NonZeroExit {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Per-attempt temporary directory. Removed when dropped, including when the
/// attempt is cancelled by a timeout.
pub type ScratchDir = TempDir;

/// An accepted upload as seen by the strategies.
#[derive(Debug, Clone)]
pub struct ExtractionInput {
    /// The uploaded bytes, on disk.
    pub path: PathBuf,
    /// Lowercased MIME essence.
    pub content_type: String,
    /// Directory under which strategies create their scratch directories.
    pub scratch_root: PathBuf,
}

impl ExtractionInput {
    /// Fresh, uniquely named scratch directory for one attempt.
    pub fn scratch_dir(&self, prefix: &str) -> Result<ScratchDir, Diagnostic> {
        Ok(tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.scratch_root)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One way of getting text out of a file.
///
/// Implementations must not leave files behind outside their scratch
/// directory and must spawn child processes so that dropping the returned
/// future terminates them.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> ExtractionStrategyKind;

    /// Budget for a single run; the engine enforces it.
    fn timeout(&self) -> Duration;

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic>;
}

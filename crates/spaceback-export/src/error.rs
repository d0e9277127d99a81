//! Error types for export runs.

use std::path::PathBuf;

use spaceback_history::HistoryError;

/// Failure talking to the content source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Network failure, timeout or unexpected server answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// Bad credentials or insufficient permission.
    #[error("not authorized: {0}")]
    Auth(String),

    /// The requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Error during an export run.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Content source call failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Local file system operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Committing the archive failed.
    #[error("history: {0}")]
    History(#[from] HistoryError),

    /// Server URL does not yield a usable link pattern.
    #[error("invalid link pattern: {0}")]
    LinkPattern(#[from] regex::Error),

    /// Worker pool could not be started.
    #[error("failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

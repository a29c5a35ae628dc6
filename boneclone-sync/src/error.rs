//! Error types for boneclone-sync.

use std::path::PathBuf;

use thiserror::Error;

use boneclone_providers::ProviderError;

/// Failures of a single git invocation or of the file copy around it.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git exited non-zero.
    #[error("git command failed: {command}\nstderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The remote refused the push (non-fast-forward, protected branch).
    #[error("push rejected: {details}")]
    PushRejected { details: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`GitError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Failure of one repository unit, labelled with the stage that failed.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("clone: {0}")]
    Clone(#[source] GitError),

    #[error("validate: {0}")]
    Validate(#[source] GitError),

    #[error("copy: {0}")]
    Copy(#[source] GitError),

    #[error("provider: {0}")]
    Provider(#[source] ProviderError),

    #[error("provider does not support pull requests")]
    Unsupported,

    #[error("create change request: {0}")]
    CreateChangeRequest(#[source] ProviderError),
}

/// A landing strategy was built without one of its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    #[error("repository operations not configured")]
    MissingOperations,

    #[error("provider factory not configured")]
    MissingProviderFactory,

    #[error("change request renderer not configured")]
    MissingRenderer,
}

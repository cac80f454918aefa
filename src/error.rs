use crate::exec::{ExecError, FailureKind};
use crate::giturl::UrlError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned by [`Client`](crate::client::Client) and the write-back flow.
///
/// Subprocess failures carry the [`ExecError`], which records the invoked
/// arguments, directory, exit code and stderr.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository URL was rejected.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// The temporary clone directory could not be created.
    #[error("cannot create temporary directory with prefix '{prefix}'")]
    TempDirCreationFailed {
        /// Name prefix requested for the directory.
        prefix: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The clone target directory could not be created.
    #[error("unable to create directory for cloning {}", path.display())]
    DirCreationFailed {
        /// Directory that was to be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// `git clone` failed.
    #[error("failed to clone repository into {}", path.display())]
    CloneFailed {
        /// Clone target directory.
        path: PathBuf,
        /// Subprocess failure.
        #[source]
        source: ExecError,
    },

    /// `git checkout` failed after a successful clone.
    #[error("failed to check out branch '{branch}' in {}", path.display())]
    CheckoutFailed {
        /// Working directory of the clone.
        path: PathBuf,
        /// Branch that was requested.
        branch: String,
        /// Subprocess failure.
        #[source]
        source: ExecError,
    },

    /// The branch heads directory could not be listed.
    #[error("unable to read branch references in {}", path.display())]
    RefsReadFailed {
        /// The `refs/heads` directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// `git add` failed.
    #[error("failed to stage files")]
    AddFailed(#[source] ExecError),

    /// `git diff --cached --quiet` could not be run.
    #[error("failed to check for staged changes")]
    DiffCheckFailed(#[source] ExecError),

    /// `git config` failed.
    #[error("failed to set {key}")]
    ConfigFailed {
        /// Configuration key being set.
        key: String,
        /// Subprocess failure.
        #[source]
        source: ExecError,
    },

    /// `git commit` failed.
    #[error("failed to commit")]
    CommitFailed(#[source] ExecError),

    /// `git push` failed.
    #[error("failed to push")]
    PushFailed(#[source] ExecError),

    /// The operation needs a working directory and none has been recorded.
    #[error("no cloned directory to operate on")]
    NoWorkingDirectory,

    /// The working copy could not be removed.
    #[error("failed to delete {}", path.display())]
    DeleteFailed {
        /// Directory being removed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file could not be copied into the working copy.
    #[error("failed to copy {} to {}", from.display(), to.display())]
    CopyFailed {
        /// Source file or directory.
        from: PathBuf,
        /// Destination inside the clone.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl GitError {
    /// The clone directory left behind by a failed clone-stage operation.
    ///
    /// Cloning does not roll back the directory it created; this lets the
    /// caller find it to inspect or remove it.
    #[must_use]
    pub fn clone_dir(&self) -> Option<&Path> {
        match self {
            Self::CloneFailed { path, .. } | Self::CheckoutFailed { path, .. } => Some(path),
            Self::RefsReadFailed { path, .. } => path.ancestors().nth(3),
            _ => None,
        }
    }

    /// The underlying subprocess failure, if this error came from one.
    #[must_use]
    pub const fn exec_error(&self) -> Option<&ExecError> {
        match self {
            Self::CloneFailed { source, .. }
            | Self::CheckoutFailed { source, .. }
            | Self::ConfigFailed { source, .. } => Some(source),
            Self::AddFailed(source)
            | Self::DiffCheckFailed(source)
            | Self::CommitFailed(source)
            | Self::PushFailed(source) => Some(source),
            _ => None,
        }
    }

    /// Category of the underlying subprocess failure, if any.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.exec_error().map(ExecError::failure_kind)
    }
}

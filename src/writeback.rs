//! # Write-back
//!
//! The complete publish cycle on top of [`Client`]:
//!
//! 1. Validate that the URL is an SSH git URL
//! 2. Clone into a temporary directory, checking out (or bootstrapping) the branch
//! 3. Copy every file of the source tree into the clone
//! 4. Stage exactly the copied files
//! 5. Commit; an identical tree is not an error
//! 6. Push, only if a commit was made
//! 7. Delete the clone unless asked to keep it
//!
//! The clone is removed on failure as well, once it exists. A failed removal
//! is logged and does not mask the original result.

use crate::client::{Client, CloneOptions, CommitOutcome};
use crate::error::GitError;
use crate::exec::Executor;
use crate::giturl::validate_url;
use crate::utils::paths::{ensure_parent_dirs, list_files};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{Level, info, span, warn};

/// Everything needed to publish a directory of files to a repository.
#[derive(Debug, Clone, Default)]
pub struct WriteBackRequest {
    /// SSH URL of the repository.
    pub url: String,
    /// Branch to commit on; the remote's default when `None`.
    pub branch: Option<String>,
    /// Create `branch` if the repository is empty.
    pub bootstrap: bool,
    /// Directory whose files are published.
    pub source_dir: PathBuf,
    /// Relative directory inside the repository to copy into.
    pub target_subdir: Option<PathBuf>,
    /// Commit message.
    pub message: String,
    /// Author name; not configured when empty.
    pub user: String,
    /// Author email; not configured when empty.
    pub email: String,
    /// Name prefix of the temporary clone directory.
    pub clone_prefix: String,
    /// Leave the clone on disk afterwards.
    pub keep_clone: bool,
}

/// What a successful write-back did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBackOutcome {
    /// Where the repository was cloned.
    pub clone_dir: PathBuf,
    /// Staged paths, relative to the repository root.
    pub files: Vec<String>,
    /// Whether a commit was created.
    pub commit: CommitOutcome,
    /// Whether anything was pushed.
    pub pushed: bool,
}

/// Publish `request.source_dir` to the repository at `request.url`.
///
/// # Errors
///
/// Returns [`GitError::Url`] for a rejected URL, [`GitError::CopyFailed`] if
/// the source tree cannot be copied, and any error of the client operations.
pub fn write_back<E: Executor>(
    client: &mut Client<E>,
    request: &WriteBackRequest,
) -> Result<WriteBackOutcome, GitError> {
    let span = span!(Level::INFO, "write_back", url = %request.url);
    let _guard = span.enter();

    validate_url(&request.url)?;
    let subdir = checked_subdir(request.target_subdir.as_deref())?;

    let options = CloneOptions {
        url: request.url.clone(),
        branch: request.branch.clone(),
        bootstrap: request.bootstrap,
    };
    let clone_dir = match client.clone_repo_in_tmp_dir(&request.clone_prefix, &options) {
        Ok(dir) => dir,
        Err(e) => {
            if !request.keep_clone
                && let Some(dir) = e.clone_dir()
            {
                discard(dir);
            }
            return Err(e);
        }
    };
    info!(dir = %clone_dir.display(), "Cloned repository");

    let result = publish(client, &clone_dir, &subdir, request);

    if !request.keep_clone
        && let Err(e) = client.delete_local_repo()
    {
        warn!(dir = %clone_dir.display(), error = ?e, "Failed to delete local clone");
    }

    let (files, commit, pushed) = result?;
    Ok(WriteBackOutcome {
        clone_dir,
        files,
        commit,
        pushed,
    })
}

fn publish<E: Executor>(
    client: &Client<E>,
    clone_dir: &Path,
    subdir: &Path,
    request: &WriteBackRequest,
) -> Result<(Vec<String>, CommitOutcome, bool), GitError> {
    let files = copy_tree(&request.source_dir, clone_dir, subdir)?;
    info!(count = files.len(), "Copied files into clone");

    client.add(&files)?;
    let commit = client.commit(&request.message, &request.user, &request.email)?;
    if commit == CommitOutcome::NothingToCommit {
        return Ok((files, commit, false));
    }

    client.push()?;
    info!("Pushed changes");
    Ok((files, commit, true))
}

/// Copy every file below `source` to `clone_dir/subdir`, returning the
/// repository-relative paths written.
fn copy_tree(source: &Path, clone_dir: &Path, subdir: &Path) -> Result<Vec<String>, GitError> {
    let relative_files = list_files(source).map_err(|e| GitError::CopyFailed {
        from: source.to_path_buf(),
        to: clone_dir.join(subdir),
        source: e,
    })?;

    let mut staged = Vec::with_capacity(relative_files.len());
    for relative in relative_files {
        let repo_path = subdir.join(&relative);
        let from = source.join(&relative);
        let to = clone_dir.join(&repo_path);

        ensure_parent_dirs(&to)
            .and_then(|()| fs::copy(&from, &to).map(drop))
            .map_err(|e| GitError::CopyFailed {
                from: from.clone(),
                to: to.clone(),
                source: e,
            })?;

        staged.push(repo_path.to_string_lossy().into_owned());
    }
    Ok(staged)
}

/// The target directory must stay inside the repository.
fn checked_subdir(subdir: Option<&Path>) -> Result<PathBuf, GitError> {
    let Some(subdir) = subdir else {
        return Ok(PathBuf::new());
    };
    let escapes = subdir
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(GitError::CopyFailed {
            from: PathBuf::new(),
            to: subdir.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "target directory must be relative to the repository root",
            ),
        });
    }
    Ok(subdir.to_path_buf())
}

fn discard(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "Failed to delete clone directory");
    }
}

//! # Git write-back client
//!
//! [`Client`] drives the `git` binary through an [`Executor`] to clone a
//! repository, stage and commit changes, push them, and remove the local copy.
//!
//! ```text
//! clone ──> checkout / checkout -b ──> add ──> diff --cached ──> commit ──> push ──> delete
//!   │                                             │
//!   └─ binds the working directory                └─ identical tree: nothing to commit
//! ```
//!
//! ## Working directory
//!
//! A client starts [`WorkDir::Unbound`]. A successful `git clone` (or an
//! explicit [`Client::attach`]) binds it to a path, and every later git
//! command runs there. Deleting the local copy does not unbind it.
//!
//! ## Empty repositories
//!
//! Cloning a repository without any commits leaves `.git/refs/heads` empty,
//! so the requested branch cannot be checked out. With
//! [`CloneOptions::bootstrap`] set the branch is created instead.
//!
//! ## Concurrency
//!
//! Every operation runs one process at a time and blocks until it exits.
//! Give each repository session its own client.

use crate::args;
use crate::error::GitError;
use crate::exec::{ExecError, Executor, ShellExecutor};
use crate::utils::paths::create_private_dir_all;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, info, span};

/// Name of the git binary.
const GIT: &str = "git";

/// Construction-time configuration for [`Client::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientParams {
    /// Private key used for every SSH connection git makes.
    pub private_ssh_key_path: Option<PathBuf>,
}

/// Environment overrides implied by `params`.
///
/// With a private key this is `GIT_SSH_COMMAND=ssh -i <path>`; the path is
/// shell-quoted only when it contains characters that need it.
#[must_use]
pub fn env_overrides(params: &ClientParams) -> Vec<(String, String)> {
    let mut env = Vec::new();
    if let Some(key) = &params.private_ssh_key_path {
        let key = key.to_string_lossy();
        env.push((
            "GIT_SSH_COMMAND".to_string(),
            format!("ssh -i {}", shell_words::quote(&key)),
        ));
    }
    env
}

/// Options for cloning a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Repository URL passed to `git clone`.
    pub url: String,
    /// Branch to switch to after cloning.
    pub branch: Option<String>,
    /// Create the branch if the repository has no branches at all.
    pub bootstrap: bool,
}

/// The directory a client runs git commands in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkDir {
    /// Nothing cloned or attached yet.
    #[default]
    Unbound,
    /// Path of the repository working copy.
    Bound(PathBuf),
}

/// Result of [`Client::commit`]. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created.
    Committed,
    /// The index matched `HEAD`, so no commit was made.
    NothingToCommit,
}

/// Performs git operations in a single working copy.
#[derive(Debug)]
pub struct Client<E = ShellExecutor> {
    /// Runs the git processes
    executor: E,
    /// Working copy, once known
    work_dir: WorkDir,
}

impl Client<ShellExecutor> {
    /// Create a client that runs git as a child process, configured from `params`.
    #[must_use]
    pub fn new(params: &ClientParams) -> Self {
        Self::from_executor(ShellExecutor::new(env_overrides(params)))
    }
}

impl<E: Executor> Client<E> {
    /// Create a client around an already configured executor.
    #[must_use]
    pub const fn from_executor(executor: E) -> Self {
        Self {
            executor,
            work_dir: WorkDir::Unbound,
        }
    }

    /// The executor this client runs commands with.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// The bound working directory, if any.
    #[must_use]
    pub fn work_dir(&self) -> Option<&Path> {
        match &self.work_dir {
            WorkDir::Unbound => None,
            WorkDir::Bound(path) => Some(path),
        }
    }

    /// Bind the client to an existing working copy it did not clone itself.
    pub fn attach(&mut self, path: impl Into<PathBuf>) {
        self.work_dir = WorkDir::Bound(path.into());
    }

    /// Clone into a fresh temporary directory named after `prefix`.
    ///
    /// The directory is not removed if a later step fails;
    /// [`GitError::clone_dir`] reports where it is.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::TempDirCreationFailed`] if the directory cannot be
    /// created, and otherwise any error of [`Client::clone_repo_in_path`].
    pub fn clone_repo_in_tmp_dir(
        &mut self,
        prefix: &str,
        options: &CloneOptions,
    ) -> Result<PathBuf, GitError> {
        let clone_dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|source| GitError::TempDirCreationFailed {
                prefix: prefix.to_string(),
                source,
            })?
            .keep();

        self.clone_into(&clone_dir, options)?;
        Ok(clone_dir)
    }

    /// Clone into `path`, creating it and any missing parents first.
    ///
    /// # Errors
    ///
    /// - [`GitError::DirCreationFailed`] if the directory cannot be created
    /// - [`GitError::CloneFailed`] if `git clone` fails
    /// - [`GitError::RefsReadFailed`] if emptiness cannot be determined
    /// - [`GitError::CheckoutFailed`] if the branch cannot be checked out
    pub fn clone_repo_in_path(
        &mut self,
        path: &Path,
        options: &CloneOptions,
    ) -> Result<(), GitError> {
        create_private_dir_all(path).map_err(|source| GitError::DirCreationFailed {
            path: path.to_path_buf(),
            source,
        })?;
        self.clone_into(path, options)
    }

    fn clone_into(&mut self, path: &Path, options: &CloneOptions) -> Result<(), GitError> {
        let span = span!(Level::DEBUG, "clone", url = %options.url, path = %path.display());
        let _guard = span.enter();

        // The clone runs wherever the caller is; the target does not hold a
        // repository until it succeeds.
        self.run_git(None, &args::clone(&options.url, path))
            .map_err(|source| GitError::CloneFailed {
                path: path.to_path_buf(),
                source,
            })?;
        self.work_dir = WorkDir::Bound(path.to_path_buf());

        let Some(branch) = options.branch.as_deref() else {
            return Ok(());
        };

        let create = options.bootstrap && self.is_repo_empty()?;
        if create {
            info!(branch, "Repository is empty, creating branch");
        }

        self.run_git(Some(path), &args::checkout(branch, create))
            .map_err(|source| GitError::CheckoutFailed {
                path: path.to_path_buf(),
                branch: branch.to_string(),
                source,
            })
    }

    /// Whether the repository has no branches yet.
    fn is_repo_empty(&self) -> Result<bool, GitError> {
        let heads = self.bound_dir()?.join(".git").join("refs").join("heads");
        let entries = fs::read_dir(&heads).map_err(|source| GitError::RefsReadFailed {
            path: heads.clone(),
            source,
        })?;
        Ok(entries.count() == 0)
    }

    /// Stage `files` with `git add -- <files...>`.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NoWorkingDirectory`] when unbound and
    /// [`GitError::AddFailed`] when git fails.
    pub fn add<S: AsRef<str>>(&self, files: &[S]) -> Result<(), GitError> {
        let dir = self.bound_dir()?;
        self.run_git(Some(dir), &args::add(files))
            .map_err(GitError::AddFailed)
    }

    /// Commit staged changes, if there are any.
    ///
    /// Non-empty `email` and `user` are written to the repository config
    /// first; the commit always carries `--author="<user> <<email>>"`.
    ///
    /// # Errors
    ///
    /// - [`GitError::NoWorkingDirectory`] when unbound
    /// - [`GitError::DiffCheckFailed`] if the staged diff cannot be checked
    /// - [`GitError::ConfigFailed`] if the identity cannot be configured
    /// - [`GitError::CommitFailed`] if `git commit` fails
    pub fn commit(&self, message: &str, user: &str, email: &str) -> Result<CommitOutcome, GitError> {
        let dir = self.bound_dir()?;
        let span = span!(Level::DEBUG, "commit", dir = %dir.display());
        let _guard = span.enter();

        match self.run_git(Some(dir), &args::diff_cached_quiet()) {
            Ok(()) => {
                info!("Nothing to commit (the repository contained identical files), moving on");
                return Ok(CommitOutcome::NothingToCommit);
            }
            Err(ExecError::ExitStatus { .. }) => {}
            Err(e) => return Err(GitError::DiffCheckFailed(e)),
        }

        // Identity is configured here rather than at clone time: nothing else
        // needs it, and the working copy may not have been cloned by us.
        for (key, value) in [("user.email", email), ("user.name", user)] {
            if value.is_empty() {
                continue;
            }
            self.run_git(Some(dir), &args::config(key, value))
                .map_err(|source| GitError::ConfigFailed {
                    key: key.to_string(),
                    source,
                })?;
        }

        self.run_git(Some(dir), &args::commit(message, user, email))
            .map_err(GitError::CommitFailed)?;
        Ok(CommitOutcome::Committed)
    }

    /// Push with git's default remote and branch resolution.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NoWorkingDirectory`] when unbound and
    /// [`GitError::PushFailed`] when git fails.
    pub fn push(&self) -> Result<(), GitError> {
        let dir = self.bound_dir()?;
        self.run_git(Some(dir), &args::push())
            .map_err(GitError::PushFailed)
    }

    /// Remove the working copy from disk.
    ///
    /// The client stays bound to the (now missing) path.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NoWorkingDirectory`] if nothing was ever cloned and
    /// [`GitError::DeleteFailed`] if removal fails.
    pub fn delete_local_repo(&self) -> Result<(), GitError> {
        let dir = self.bound_dir()?;
        debug!(dir = %dir.display(), "Deleting local repository");
        fs::remove_dir_all(dir).map_err(|source| GitError::DeleteFailed {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn bound_dir(&self) -> Result<&Path, GitError> {
        self.work_dir().ok_or(GitError::NoWorkingDirectory)
    }

    fn run_git(&self, dir: Option<&Path>, args: &[String]) -> Result<(), ExecError> {
        debug!(
            ?args,
            dir = %dir.map_or_else(|| ".".into(), |d| d.display().to_string()),
            "Running git"
        );
        self.executor.exec(GIT, dir, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RecordingExecutor, Remote};

    fn options(branch: Option<&str>, bootstrap: bool) -> CloneOptions {
        CloneOptions {
            url: "ssh://git@host/org/repo.git".to_string(),
            branch: branch.map(str::to_string),
            bootstrap,
        }
    }

    #[test]
    fn test_env_overrides() {
        assert!(env_overrides(&ClientParams::default()).is_empty());

        let params = ClientParams {
            private_ssh_key_path: Some(PathBuf::from("/keys/id_ed25519")),
        };
        assert_eq!(
            env_overrides(&params),
            [("GIT_SSH_COMMAND".to_string(), "ssh -i /keys/id_ed25519".to_string())]
        );
    }

    #[test]
    fn test_env_overrides_quote_awkward_paths() {
        let params = ClientParams {
            private_ssh_key_path: Some(PathBuf::from("/keys/deploy key")),
        };
        assert_eq!(env_overrides(&params)[0].1, "ssh -i '/keys/deploy key'");
    }

    #[test]
    fn test_new_client_carries_overrides() {
        let params = ClientParams {
            private_ssh_key_path: Some(PathBuf::from("/keys/id_rsa")),
        };
        let client = Client::new(&params);
        assert_eq!(client.executor().env(), env_overrides(&params).as_slice());
        assert_eq!(client.work_dir(), None);
    }

    #[test]
    fn test_clone_binds_work_dir_after_clone() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("nested/clone");
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::WithBranches));

        client
            .clone_repo_in_path(&target, &options(None, false))
            .unwrap();

        assert!(target.exists());
        assert_eq!(client.work_dir(), Some(target.as_path()));
        let calls = client.executor().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "git");
        // Clone runs before the working directory exists as a repository
        assert_eq!(calls[0].dir, None);
        assert_eq!(calls[0].args, args::clone("ssh://git@host/org/repo.git", &target));
    }

    #[test]
    fn test_bootstrap_on_empty_repo_creates_branch() {
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        let dir = client
            .clone_repo_in_tmp_dir("gitwrite-test-", &options(Some("main"), true))
            .unwrap();

        assert_eq!(
            client.executor().args(),
            vec![
                args::clone("ssh://git@host/org/repo.git", &dir),
                args::checkout("main", true),
            ]
        );
        client.delete_local_repo().unwrap();
    }

    #[test]
    fn test_bootstrap_on_populated_repo_checks_out() {
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::WithBranches));
        let dir = client
            .clone_repo_in_tmp_dir("gitwrite-test-", &options(Some("main"), true))
            .unwrap();

        assert_eq!(client.executor().args()[1], args::checkout("main", false));
        assert_eq!(client.executor().calls()[1].dir.as_deref(), Some(dir.as_path()));
        client.delete_local_repo().unwrap();
    }

    #[test]
    fn test_checkout_without_bootstrap_fails_on_empty_repo() {
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        let err = client
            .clone_repo_in_tmp_dir("gitwrite-test-", &options(Some("main"), false))
            .unwrap_err();

        assert!(matches!(err, GitError::CheckoutFailed { ref branch, .. } if branch == "main"));
        assert_eq!(client.executor().args()[1], args::checkout("main", false));

        // The clone stays in place for the caller
        let dir = err.clone_dir().unwrap().to_path_buf();
        assert!(dir.exists());
        assert_eq!(client.work_dir(), Some(dir.as_path()));
        client.delete_local_repo().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_clone_failure_leaves_client_unbound() {
        let temp = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new(Remote::WithBranches).failing_on("clone");
        let mut client = Client::from_executor(executor);

        let err = client
            .clone_repo_in_path(temp.path(), &options(Some("main"), true))
            .unwrap_err();

        assert!(matches!(err, GitError::CloneFailed { .. }));
        assert_eq!(err.clone_dir(), Some(temp.path()));
        assert_eq!(client.work_dir(), None);
        assert_eq!(client.executor().calls().len(), 1);
    }

    #[test]
    fn test_empty_check_fails_without_refs() {
        let temp = tempfile::tempdir().unwrap();
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        client.attach(temp.path());
        assert!(matches!(
            client.is_repo_empty(),
            Err(GitError::RefsReadFailed { .. })
        ));
    }

    #[test]
    fn test_add_uses_separator() {
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        client.attach("/work");
        client.add(&["--force", "file.yaml"]).unwrap();
        assert_eq!(client.executor().args(), vec![args::add(&["--force", "file.yaml"])]);
        assert_eq!(client.executor().calls()[0].dir.as_deref(), Some(Path::new("/work")));
    }

    #[test]
    fn test_add_failure() {
        let mut client =
            Client::from_executor(RecordingExecutor::new(Remote::Empty).failing_on("add"));
        client.attach("/work");
        assert!(matches!(client.add(&["x"]), Err(GitError::AddFailed(_))));
    }

    #[test]
    fn test_commit_with_nothing_staged() {
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        client.attach("/work");

        let outcome = client.commit("update", "bot", "bot@example.com").unwrap();

        assert_eq!(outcome, CommitOutcome::NothingToCommit);
        assert_eq!(client.executor().args(), vec![args::diff_cached_quiet()]);
    }

    #[test]
    fn test_commit_configures_identity() {
        let mut client =
            Client::from_executor(RecordingExecutor::new(Remote::Empty).with_staged_changes());
        client.attach("/work");

        let outcome = client.commit("update", "bot", "bot@example.com").unwrap();

        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(
            client.executor().args(),
            vec![
                args::diff_cached_quiet(),
                args::config("user.email", "bot@example.com"),
                args::config("user.name", "bot"),
                args::commit("update", "bot", "bot@example.com"),
            ]
        );
    }

    #[test]
    fn test_commit_skips_empty_identity() {
        let mut client =
            Client::from_executor(RecordingExecutor::new(Remote::Empty).with_staged_changes());
        client.attach("/work");

        client.commit("update", "", "").unwrap();

        assert_eq!(
            client.executor().args(),
            vec![args::diff_cached_quiet(), args::commit("update", "", "")]
        );
    }

    #[test]
    fn test_commit_propagates_diff_spawn_failure() {
        let mut client =
            Client::from_executor(RecordingExecutor::new(Remote::Empty).unable_to_spawn("diff"));
        client.attach("/work");
        assert!(matches!(
            client.commit("update", "bot", "bot@example.com"),
            Err(GitError::DiffCheckFailed(_))
        ));
        assert_eq!(client.executor().calls().len(), 1);
    }

    #[test]
    fn test_commit_config_and_commit_failures() {
        let mut client = Client::from_executor(
            RecordingExecutor::new(Remote::Empty)
                .with_staged_changes()
                .failing_on("config"),
        );
        client.attach("/work");
        match client.commit("update", "bot", "bot@example.com") {
            Err(GitError::ConfigFailed { key, .. }) => assert_eq!(key, "user.email"),
            other => panic!("expected config failure, got {other:?}"),
        }

        let mut client = Client::from_executor(
            RecordingExecutor::new(Remote::Empty)
                .with_staged_changes()
                .failing_on("commit"),
        );
        client.attach("/work");
        assert!(matches!(
            client.commit("update", "bot", "bot@example.com"),
            Err(GitError::CommitFailed(_))
        ));
    }

    #[test]
    fn test_push() {
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        client.attach("/work");
        client.push().unwrap();
        assert_eq!(client.executor().args(), vec![args::push()]);

        let mut client =
            Client::from_executor(RecordingExecutor::new(Remote::Empty).failing_on("push"));
        client.attach("/work");
        assert!(matches!(client.push(), Err(GitError::PushFailed(_))));
    }

    #[test]
    fn test_unbound_operations_fail() {
        let client = Client::from_executor(RecordingExecutor::new(Remote::Empty));
        assert!(matches!(client.delete_local_repo(), Err(GitError::NoWorkingDirectory)));
        assert!(matches!(client.add(&["a"]), Err(GitError::NoWorkingDirectory)));
        assert!(matches!(client.commit("m", "u", "e"), Err(GitError::NoWorkingDirectory)));
        assert!(matches!(client.push(), Err(GitError::NoWorkingDirectory)));
        assert!(client.executor().calls().is_empty());
    }

    #[test]
    fn test_delete_keeps_binding() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("clone");
        let mut client = Client::from_executor(RecordingExecutor::new(Remote::WithBranches));
        client
            .clone_repo_in_path(&target, &options(None, false))
            .unwrap();

        client.delete_local_repo().unwrap();

        assert!(!target.exists());
        assert_eq!(client.work_dir(), Some(target.as_path()));
        assert!(matches!(
            client.delete_local_repo(),
            Err(GitError::DeleteFailed { .. })
        ));
    }
}

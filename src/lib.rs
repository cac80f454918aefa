#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gitwrite - GitOps write-back over the git CLI
//!
//! gitwrite clones a repository, applies changes, and publishes them back,
//! by driving the `git` binary as a child process. It is built for
//! automation that owns a configuration repository and needs to commit to
//! it unattended.
//!
//! ## Features
//!
//! - **SSH only**: HTTP(S) URLs are rejected before anything runs
//! - **Deploy keys**: a private key path turns into `GIT_SSH_COMMAND` for every git call
//! - **Empty repositories**: the target branch can be bootstrapped on first write
//! - **Idempotent commits**: an unchanged tree is a success, not an error
//!
//! ## Architecture
//!
//! - [`giturl`]: URL parsing, validation and repository names
//! - [`args`]: argument vectors for each git subcommand
//! - [`exec`]: the [`Executor`](exec::Executor) seam and its process-backed implementation
//! - [`client`]: the stateful [`Client`](client::Client)
//! - [`writeback`]: the complete clone, copy, commit, push cycle
//! - [`config`]: configuration file handling
//!
//! ## Example Usage
//!
//! ```no_run
//! use gitwrite::client::{Client, ClientParams, CloneOptions};
//!
//! # fn main() -> Result<(), gitwrite::GitError> {
//! gitwrite::giturl::validate_url("git@github.com:org/fleet.git")?;
//!
//! let mut client = Client::new(&ClientParams {
//!     private_ssh_key_path: Some("/keys/deploy".into()),
//! });
//! let options = CloneOptions {
//!     url: "git@github.com:org/fleet.git".to_string(),
//!     branch: Some("main".to_string()),
//!     bootstrap: true,
//! };
//! let dir = client.clone_repo_in_tmp_dir("fleet-", &options)?;
//! std::fs::write(dir.join("release.yaml"), "version: 2\n").ok();
//!
//! client.add(&["release.yaml"])?;
//! client.commit("Bump release", "bot", "bot@example.com")?;
//! client.push()?;
//! client.delete_local_repo()?;
//! # Ok(())
//! # }
//! ```

/// Argument vectors for the git subcommands the client runs.
pub mod args;

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Stateful git client.
pub mod client;

/// Implementations of the CLI subcommands.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Error type for client operations.
pub mod error;

/// Process execution.
pub mod exec;

/// Git URL parsing and validation.
pub mod giturl;

/// Terminal output with verbosity control.
pub mod output;

/// Utility functions and helpers.
pub mod utils;

/// End-to-end publish flow.
pub mod writeback;

/// Test fixtures shared by unit tests.
#[cfg(test)]
pub(crate) mod test_utils;

use anyhow::Result;
use std::path::PathBuf;

pub use client::{Client, ClientParams, CloneOptions, CommitOutcome};
pub use error::GitError;
pub use giturl::{UrlError, is_git_url, repo_name, validate_url};
pub use writeback::{WriteBackOutcome, WriteBackRequest, write_back};

/// Current version of the gitwrite binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// State shared by the CLI subcommands.
///
/// # Example
///
/// ```no_run
/// use gitwrite::GitwriteContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Load from $GITWRITE_CONFIG_PATH or ~/.config/gitwrite/config.toml
/// let ctx = GitwriteContext::new()?;
///
/// // Or from an explicit file (for testing)
/// let ctx = GitwriteContext::new_explicit("/tmp/gitwrite.toml".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GitwriteContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl GitwriteContext {
    /// Creates a context from the configuration at the default path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file exists but cannot be read or validated.
    pub fn new() -> Result<Self> {
        Self::new_explicit(config::Config::default_path()?)
    }

    /// Creates a context from the configuration file at `config_path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or validated.
    pub fn new_explicit(config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }
}

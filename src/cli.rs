//! Command-line interface definitions for gitwrite.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes and doc comments,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for gitwrite.
#[derive(Parser)]
#[command(
    name = "gitwrite",
    version = crate::VERSION,
    about = "Publish files to a git repository over SSH",
    long_about = "Clones a repository over SSH, copies a directory of files into it, \
                  commits and pushes. Built for GitOps automation writing back to \
                  configuration repositories."
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output (git invocations included)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Check that a URL is an SSH git URL accepted for write-back
    Validate {
        /// Repository URL
        url: String,
    },

    /// Print the short repository name derived from a URL
    Name {
        /// Repository URL
        url: String,
    },

    /// Clone, copy a directory into the clone, commit and push
    Push(PushArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `gitwrite push`. Unset options fall back to the config file.
#[derive(Args, Debug, Clone)]
pub struct PushArgs {
    /// SSH URL of the repository
    #[arg(long, env = "GITWRITE_URL")]
    pub url: String,

    /// Branch to commit on (defaults to git.branch, then the remote's default)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Create the branch if the repository is empty
    #[arg(long)]
    pub bootstrap: bool,

    /// Directory whose files are published
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Directory inside the repository to copy into
    #[arg(long)]
    pub subdir: Option<PathBuf>,

    /// Commit message
    #[arg(short, long)]
    pub message: String,

    /// Author name (defaults to user.name)
    #[arg(long)]
    pub user: Option<String>,

    /// Author email (defaults to user.email)
    #[arg(long)]
    pub email: Option<String>,

    /// Private SSH key (defaults to git.private_ssh_key_path)
    #[arg(long, env = "GITWRITE_SSH_KEY")]
    pub ssh_key: Option<PathBuf>,

    /// Name prefix of the temporary clone (defaults to git.clone_prefix)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Keep the clone on disk afterwards
    #[arg(long)]
    pub keep: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show all configuration values
    List,

    /// Print one configuration value
    Get {
        /// Configuration key (section.name)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (section.name)
        key: String,

        /// New value
        value: String,
    },
}

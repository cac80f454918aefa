//! Process execution.
//!
//! Everything the client does goes through the [`Executor`] trait: run a
//! command with arguments in a directory and report whether it exited
//! cleanly. The production implementation is [`ShellExecutor`]; tests
//! substitute a recording executor.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, trace};

/// Classification of git failures from their stderr
pub mod diagnosis;

pub use diagnosis::FailureKind;

/// Failure to run a command to a successful exit.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The process ran and exited with a non-zero status (or was killed by a signal).
    #[error("`{command} {}` in {} exited with {}: {}",
        args.join(" "),
        display_dir(dir.as_deref()),
        display_code(*code),
        diagnosis::summarize(stderr))]
    ExitStatus {
        /// Program that was run.
        command: String,
        /// Arguments it was given.
        args: Vec<String>,
        /// Directory it ran in; `None` means the caller's current directory.
        dir: Option<PathBuf>,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The process could not be started at all.
    #[error("failed to run `{command} {}` in {}",
        args.join(" "),
        display_dir(dir.as_deref()))]
    Spawn {
        /// Program that was run.
        command: String,
        /// Arguments it was given.
        args: Vec<String>,
        /// Directory it was to run in.
        dir: Option<PathBuf>,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    /// Whether this is a non-zero exit rather than a failure to start.
    #[must_use]
    pub const fn is_exit_status(&self) -> bool {
        matches!(self, Self::ExitStatus { .. })
    }

    /// Exit code of the process, when it ran and exited normally.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::ExitStatus { code, .. } => *code,
            Self::Spawn { .. } => None,
        }
    }

    /// Best-effort category of the failure for user guidance.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::ExitStatus { stderr, .. } => FailureKind::from_stderr(stderr),
            Self::Spawn { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
                FailureKind::Permission
            }
            Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                FailureKind::NotFound
            }
            Self::Spawn { .. } => FailureKind::Unknown,
        }
    }
}

fn display_dir(dir: Option<&Path>) -> String {
    dir.map_or_else(|| "the current directory".to_string(), |d| d.display().to_string())
}

fn display_code(code: Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}"))
}

/// Runs external commands.
pub trait Executor {
    /// Run `command` with `args`, in `dir` if given, and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::ExitStatus`] when the process exits unsuccessfully
    /// and [`ExecError::Spawn`] when it cannot be started.
    fn exec(&self, command: &str, dir: Option<&Path>, args: &[String]) -> Result<(), ExecError>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn exec(&self, command: &str, dir: Option<&Path>, args: &[String]) -> Result<(), ExecError> {
        (**self).exec(command, dir, args)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn exec(&self, command: &str, dir: Option<&Path>, args: &[String]) -> Result<(), ExecError> {
        (**self).exec(command, dir, args)
    }
}

/// Executes commands as child processes with a fixed set of environment overrides.
///
/// Standard input is closed so git can never block on a prompt; standard
/// output and error are captured.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    /// Variables set on every child on top of the inherited environment.
    env: Vec<(String, String)>,
}

impl ShellExecutor {
    /// Create an executor that applies `env` to every process it starts.
    #[must_use]
    pub const fn new(env: Vec<(String, String)>) -> Self {
        Self { env }
    }

    /// Environment overrides applied to each child.
    #[must_use]
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }
}

impl Executor for ShellExecutor {
    fn exec(&self, command: &str, dir: Option<&Path>, args: &[String]) -> Result<(), ExecError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| ExecError::Spawn {
            command: command.to_string(),
            args: args.to_vec(),
            dir: dir.map(Path::to_path_buf),
            source,
        })?;

        trace!(
            command,
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "Process output"
        );

        if output.status.success() {
            return Ok(());
        }

        debug!(command, ?args, code = ?output.status.code(), "Process exited unsuccessfully");
        Err(ExecError::ExitStatus {
            command: command.to_string(),
            args: args.to_vec(),
            dir: dir.map(Path::to_path_buf),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

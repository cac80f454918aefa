use crate::exec::{ExecError, Executor};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// State of the simulated remote repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remote {
    /// No commits, no branches.
    Empty,
    /// Has a `main` branch.
    WithBranches,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub command: String,
    pub dir: Option<PathBuf>,
    pub args: Vec<String>,
}

/// Executor that records every call and simulates just enough of git.
///
/// `clone` lays out `.git/refs/heads` in the target (with a `main` head
/// unless the remote is empty), a plain `checkout` of an empty remote fails,
/// and `diff --cached --quiet` reports changes only when told to.
#[derive(Debug)]
pub struct RecordingExecutor {
    remote: Remote,
    staged_changes: bool,
    fail_on: Option<&'static str>,
    spawn_fail_on: Option<&'static str>,
    calls: RefCell<Vec<Call>>,
}

impl RecordingExecutor {
    pub const fn new(remote: Remote) -> Self {
        Self {
            remote,
            staged_changes: false,
            fail_on: None,
            spawn_fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Make `diff --cached --quiet` report staged changes.
    pub fn with_staged_changes(mut self) -> Self {
        self.staged_changes = true;
        self
    }

    /// Make the given subcommand exit with status 1.
    pub fn failing_on(mut self, subcommand: &'static str) -> Self {
        self.fail_on = Some(subcommand);
        self
    }

    /// Make the given subcommand fail to start.
    pub fn unable_to_spawn(mut self, subcommand: &'static str) -> Self {
        self.spawn_fail_on = Some(subcommand);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn args(&self) -> Vec<Vec<String>> {
        self.calls.borrow().iter().map(|c| c.args.clone()).collect()
    }

    fn exit(command: &str, dir: Option<&Path>, args: &[String], stderr: &str) -> ExecError {
        ExecError::ExitStatus {
            command: command.to_string(),
            args: args.to_vec(),
            dir: dir.map(Path::to_path_buf),
            code: Some(1),
            stderr: stderr.to_string(),
        }
    }
}

impl Executor for RecordingExecutor {
    fn exec(&self, command: &str, dir: Option<&Path>, args: &[String]) -> Result<(), ExecError> {
        self.calls.borrow_mut().push(Call {
            command: command.to_string(),
            dir: dir.map(Path::to_path_buf),
            args: args.to_vec(),
        });

        let subcommand = args.first().map_or("", String::as_str);

        if self.spawn_fail_on == Some(subcommand) {
            return Err(ExecError::Spawn {
                command: command.to_string(),
                args: args.to_vec(),
                dir: dir.map(Path::to_path_buf),
                source: io::Error::new(io::ErrorKind::NotFound, "simulated spawn failure"),
            });
        }
        if self.fail_on == Some(subcommand) {
            return Err(Self::exit(command, dir, args, "fatal: simulated failure"));
        }

        match subcommand {
            "clone" => {
                let heads = Path::new(&args[2]).join(".git/refs/heads");
                fs::create_dir_all(&heads).expect("simulated clone layout");
                if self.remote == Remote::WithBranches {
                    fs::write(heads.join("main"), "0000000000000000000000000000000000000000\n")
                        .expect("simulated branch head");
                }
                Ok(())
            }
            "checkout" if self.remote == Remote::Empty && !args.iter().any(|a| a == "-b") => {
                Err(Self::exit(
                    command,
                    dir,
                    args,
                    "error: pathspec 'main' did not match any file(s) known to git",
                ))
            }
            "diff" if self.staged_changes => Err(Self::exit(command, dir, args, "")),
            _ => Ok(()),
        }
    }
}

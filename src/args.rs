//! Argument vectors for every `git` subcommand the client issues.
//!
//! Each function is a pure mapping from operation parameters to the ordered
//! arguments passed after `git`, so the exact wire contract can be checked
//! without spawning anything.

use std::path::Path;

/// `clone <url> <dir>`
#[must_use]
pub fn clone(url: &str, dir: &Path) -> Vec<String> {
    vec![
        "clone".to_string(),
        url.to_string(),
        dir.to_string_lossy().into_owned(),
    ]
}

/// `checkout <branch>`, or `checkout -b <branch>` when the branch must be created.
#[must_use]
pub fn checkout(branch: &str, create: bool) -> Vec<String> {
    let mut args = vec!["checkout".to_string()];
    if create {
        args.push("-b".to_string());
    }
    args.push(branch.to_string());
    args
}

/// `add -- <files...>`
///
/// The `--` separator is always present so a path can never be read as a flag.
#[must_use]
pub fn add<S: AsRef<str>>(files: &[S]) -> Vec<String> {
    let mut args = vec!["add".to_string(), "--".to_string()];
    args.extend(files.iter().map(|f| f.as_ref().to_string()));
    args
}

/// `diff --cached --quiet`, which exits 0 when the index matches `HEAD`.
#[must_use]
pub fn diff_cached_quiet() -> Vec<String> {
    vec![
        "diff".to_string(),
        "--cached".to_string(),
        "--quiet".to_string(),
    ]
}

/// `config <key> <value>` in the repository-local scope.
#[must_use]
pub fn config(key: &str, value: &str) -> Vec<String> {
    vec!["config".to_string(), key.to_string(), value.to_string()]
}

/// `commit -m <message> --author=<user> <<email>>`
#[must_use]
pub fn commit(message: &str, user: &str, email: &str) -> Vec<String> {
    vec![
        "commit".to_string(),
        "-m".to_string(),
        message.to_string(),
        format!("--author={user} <{email}>"),
    ]
}

/// `push` to whatever remote and branch git resolves by default.
#[must_use]
pub fn push() -> Vec<String> {
    vec!["push".to_string()]
}

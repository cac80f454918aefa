use std::fmt;

/// Category of a failed git invocation, inferred from its stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network-related errors (DNS, connection timeout, unreachable)
    Network,
    /// Authentication failures (SSH keys, host keys)
    Authentication,
    /// Resource not found (branch, remote, repository)
    NotFound,
    /// Push rejected or conflicting changes
    Conflict,
    /// File system permission errors
    Permission,
    /// Invalid reference name or format
    InvalidRef,
    /// Unknown or uncategorized error
    Unknown,
}

impl FailureKind {
    /// Categorize a failure from the stderr git printed.
    #[must_use]
    pub fn from_stderr(stderr: &str) -> Self {
        let stderr = stderr.to_lowercase();
        let any = |needles: &[&str]| needles.iter().any(|n| stderr.contains(n));

        // Order matters: "permission denied (publickey)" is an auth failure,
        // "permission denied (os error 13)" is a filesystem one.
        if any(&[
            "could not resolve host",
            "connection timed out",
            "network is unreachable",
            "failed to connect",
            "connection refused",
            "connection closed by remote host",
        ]) {
            Self::Network
        } else if any(&["os error", "unable to create", "read-only", "cannot open"]) {
            Self::Permission
        } else if any(&[
            "permission denied",
            "publickey",
            "host key verification failed",
            "authentication failed",
            "could not read from remote repository",
        ]) {
            Self::Authentication
        } else if any(&[
            "does not exist",
            "not found",
            "did not match any file",
            "couldn't find remote ref",
            "no such",
        ]) {
            Self::NotFound
        } else if any(&["non-fast-forward", "rejected", "failed to push some refs", "conflict"]) {
            Self::Conflict
        } else if any(&["not a valid branch name", "invalid ref", "bad revision", "ambiguous argument"]) {
            Self::InvalidRef
        } else {
            Self::Unknown
        }
    }

    /// Whether the failure is transient and the caller may try again.
    ///
    /// Nothing in this crate retries; this only informs the caller.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Network)
    }

    /// Actionable guidance for the user.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Network => {
                "Check network connectivity to the git host and that the URL is correct. \
                 This error may be transient."
            }
            Self::Authentication => {
                "Verify the SSH key has access to the repository (--ssh-key or \
                 git.private_ssh_key_path) and that the host key is known."
            }
            Self::NotFound => "Verify the repository URL and that the branch exists, or use --bootstrap.",
            Self::Conflict => {
                "The remote moved while the change was being prepared. Run the write-back again."
            }
            Self::Permission => "Check file and directory permissions of the clone directory.",
            Self::InvalidRef => "Check the branch name for invalid characters.",
            Self::Unknown => "Inspect the git output above for details.",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network error",
            Self::Authentication => "authentication error",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Permission => "permission denied",
            Self::InvalidRef => "invalid reference",
            Self::Unknown => "unknown error",
        };
        f.write_str(label)
    }
}

/// Collapse git's stderr to its first few meaningful lines.
#[must_use]
pub fn summarize(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(3)
        .collect();

    if lines.is_empty() {
        return "no error output".to_string();
    }

    lines.join(" | ")
}

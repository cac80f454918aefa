#![allow(dead_code)]

use anyhow::{Context, Result};
use gitwrite::Client;
use gitwrite::exec::ShellExecutor;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Whether a `git` binary is available; real-git tests skip themselves otherwise.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// An isolated git environment: its own `HOME` with a private global
/// config, so neither the user's settings nor system config leak in.
pub struct GitSandbox {
    pub temp_dir: TempDir,
    home: PathBuf,
}

impl GitSandbox {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let home = temp_dir.path().join("home");
        fs::create_dir_all(&home)?;
        fs::write(
            home.join(".gitconfig"),
            "[init]\n\tdefaultBranch = main\n\tdefaultRefFormat = files\n\
             [user]\n\tname = Sandbox\n\temail = sandbox@example.com\n\
             [commit]\n\tgpgsign = false\n",
        )?;
        Ok(Self { temp_dir, home })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Environment applied to every git process in the sandbox.
    pub fn env(&self) -> Vec<(String, String)> {
        let home = self.home.to_string_lossy().into_owned();
        vec![
            ("HOME".to_string(), home.clone()),
            ("XDG_CONFIG_HOME".to_string(), format!("{home}/.config")),
            ("GIT_CONFIG_NOSYSTEM".to_string(), "1".to_string()),
        ]
    }

    /// A client whose git processes run inside the sandbox.
    pub fn client(&self) -> Client<ShellExecutor> {
        Client::from_executor(ShellExecutor::new(self.env()))
    }

    /// Run git in `dir` and return its standard output.
    pub fn git(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .envs(self.env())
            .output()
            .context("Failed to run git")?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Create a bare repository without any commits.
    pub fn bare_remote(&self, name: &str) -> Result<PathBuf> {
        let remote_path = self.path().join(name);
        fs::create_dir_all(&remote_path)?;
        self.git(&remote_path, &["init", "--bare"])?;
        Ok(remote_path)
    }

    /// Create a bare repository whose `main` branch holds `files`.
    pub fn seeded_remote(&self, name: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
        let remote_path = self.bare_remote(name)?;
        let seed = self.path().join(format!("{name}-seed"));
        self.git(
            self.path(),
            &["clone", &remote_path.to_string_lossy(), &seed.to_string_lossy()],
        )?;

        for (path, content) in files {
            let file = seed.join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(file, content)?;
        }
        self.git(&seed, &["add", "--all"])?;
        self.git(&seed, &["commit", "-m", "Seed"])?;
        self.git(&seed, &["push", "origin", "HEAD:refs/heads/main"])?;
        self.git(&remote_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
        fs::remove_dir_all(seed)?;

        Ok(remote_path)
    }

    /// Make git resolve `url` to the local repository at `remote`, so SSH
    /// URLs can be exercised without a server.
    pub fn alias_url(&self, url: &str, remote: &Path) -> Result<()> {
        let key = format!("url.{}.insteadOf", remote.display());
        self.git(self.path(), &["config", "--global", &key, url])?;
        Ok(())
    }

    /// Contents of `path` on `branch` of a bare repository.
    pub fn show(&self, remote: &Path, branch: &str, path: &str) -> Result<String> {
        self.git(remote, &["show", &format!("{branch}:{path}")])
    }

    /// Number of commits on `branch` of a repository.
    pub fn commit_count(&self, repo: &Path, branch: &str) -> Result<usize> {
        Ok(self.git(repo, &["rev-list", "--count", branch])?.parse()?)
    }
}

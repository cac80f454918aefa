use crate::GitwriteContext;
use crate::cli::PushArgs;
use crate::client::{Client, ClientParams, CommitOutcome};
use crate::config::Config;
use crate::giturl::validate_url;
use crate::output;
use crate::utils::expand_tilde;
use crate::writeback::{WriteBackRequest, write_back};
use anyhow::{Context, Result};

/// Execute push command - publish a directory to a repository
///
/// Command-line options take precedence over the configuration file.
///
/// # Errors
///
/// Returns an error if:
/// - The URL is not an SSH git URL
/// - The source directory does not exist
/// - No commit author is given or configured
/// - `git` is not installed
/// - Any step of the clone, commit, push cycle fails
pub fn execute(ctx: &GitwriteContext, args: &PushArgs) -> Result<()> {
    validate_url(&args.url)?;
    let request = build_request(&ctx.config, args)?;
    let params = client_params(&ctx.config, args)?;

    if !request.source_dir.is_dir() {
        anyhow::bail!(
            "Source directory does not exist: {}",
            request.source_dir.display()
        );
    }
    if request.user.is_empty() || request.email.is_empty() {
        anyhow::bail!(
            "Commit author is not set: pass --user and --email or set user.name and user.email"
        );
    }
    which::which("git").context("git executable not found in PATH")?;

    output::action(
        "Publishing",
        &format!("{} to {}", request.source_dir.display(), request.url),
    );

    let mut client = Client::new(&params);
    let outcome = write_back(&mut client, &request)
        .with_context(|| format!("Failed to write back to {}", request.url))?;

    for file in &outcome.files {
        output::verbose(&format!("  {file}"));
    }
    match outcome.commit {
        CommitOutcome::Committed => output::success(&format!(
            "Pushed {} file(s) to {}",
            outcome.files.len(),
            request.url
        )),
        CommitOutcome::NothingToCommit => {
            output::info("Nothing to commit, the repository already contains these files");
        }
    }
    if request.keep_clone {
        output::info(&format!("Clone kept at {}", outcome.clone_dir.display()));
    }

    Ok(())
}

/// Merge command-line options over the configuration file.
fn build_request(config: &Config, args: &PushArgs) -> Result<WriteBackRequest> {
    let source_dir = expand_tilde(&args.source)?;

    Ok(WriteBackRequest {
        url: args.url.clone(),
        branch: args.branch.clone().or_else(|| config.git.branch.clone()),
        bootstrap: args.bootstrap || config.git.bootstrap,
        source_dir,
        target_subdir: args.subdir.clone(),
        message: args.message.clone(),
        user: args
            .user
            .clone()
            .or_else(|| config.user.name.clone())
            .unwrap_or_default(),
        email: args
            .email
            .clone()
            .or_else(|| config.user.email.clone())
            .unwrap_or_default(),
        clone_prefix: args
            .prefix
            .clone()
            .unwrap_or_else(|| config.git.clone_prefix.clone()),
        keep_clone: args.keep,
    })
}

fn client_params(config: &Config, args: &PushArgs) -> Result<ClientParams> {
    let mut config = config.clone();
    if let Some(key) = &args.ssh_key {
        config.git.private_ssh_key_path = Some(key.clone());
    }
    config.client_params()
}

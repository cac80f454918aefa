use crate::GitwriteContext;
use crate::cli::ConfigAction;
use crate::config::Config;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to create, show, get or set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - `init` would overwrite an existing file without `--force`
/// - The key is unknown or the value is invalid
/// - Failed to save configuration
pub fn execute(ctx: &mut GitwriteContext, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { force } => init(ctx, force),
        ConfigAction::List => {
            show_all_config(&ctx.config);
            Ok(())
        }
        ConfigAction::Get { key } => {
            if let Some(val) = ctx.config.get(&key) {
                println!("{val}");
            } else {
                output::warning(&format!("Configuration key '{key}' is not set"));
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            ctx.config.set(&key, value.clone())?;
            ctx.config.save(&ctx.config_path)?;
            output::success(&format!("Set {key} = {value}"));
            Ok(())
        }
    }
}

fn init(ctx: &mut GitwriteContext, force: bool) -> Result<()> {
    if ctx.config_path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            ctx.config_path.display()
        );
    }

    ctx.config = Config::default();
    ctx.config.save(&ctx.config_path)?;
    output::success(&format!(
        "Wrote default configuration to {}",
        ctx.config_path.display()
    ));
    Ok(())
}

/// Show all configuration values
fn show_all_config(config: &Config) {
    println!("{}", "[git]".bold());
    if let Some(key) = &config.git.private_ssh_key_path {
        println!("  private_ssh_key_path = {}", key.display());
    }
    println!("  clone_prefix = {}", config.git.clone_prefix);
    if let Some(branch) = &config.git.branch {
        println!("  branch = {branch}");
    }
    println!("  bootstrap = {}", config.git.bootstrap);

    println!("\n{}", "[user]".bold());
    if let Some(name) = &config.user.name {
        println!("  name = {name}");
    }
    if let Some(email) = &config.user.email {
        println!("  email = {email}");
    }
}

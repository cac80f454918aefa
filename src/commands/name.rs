use crate::giturl::repo_name;
use anyhow::{Context, Result};

/// Execute name command - print the repository name derived from `url`
///
/// # Errors
///
/// Returns an error if the URL does not parse or has no path
pub fn execute(url: &str) -> Result<()> {
    let name = repo_name(url).with_context(|| format!("Cannot derive a name from '{url}'"))?;
    println!("{name}");
    Ok(())
}

use crate::giturl::{GitUrl, validate_url};
use crate::output;
use anyhow::Result;

/// Execute validate command - check that `url` is accepted for write-back
///
/// Prints `valid` on success.
///
/// # Errors
///
/// Returns the [`UrlError`](crate::giturl::UrlError) explaining the rejection
pub fn execute(url: &str) -> Result<()> {
    validate_url(url)?;

    if let Ok(parsed) = GitUrl::parse(url) {
        output::verbose(&format!(
            "scheme: {}, host: {}, path: {}",
            parsed.scheme, parsed.host, parsed.path
        ));
    }
    println!("valid");
    Ok(())
}

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Creates a directory and all missing parents, readable only by the owner.
///
/// Already existing directories are left as they are.
///
/// # Errors
///
/// Returns the underlying I/O error if any component cannot be created
pub fn create_private_dir_all(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

/// Ensures parent directories exist for a given path
///
/// # Errors
///
/// Returns the underlying I/O error if the parent directories cannot be created
pub fn ensure_parent_dirs(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Some(path_str) = path.to_str() else {
        return Ok(path.to_path_buf());
    };

    if path_str == "~" {
        return dirs::home_dir().context("Could not find home directory");
    }
    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }
    Ok(path.to_path_buf())
}

/// Lists every regular file below `root` as a path relative to `root`.
///
/// `.git` directories are skipped and symlinks are not followed. The result
/// is sorted so staging order is stable.
///
/// # Errors
///
/// Returns the walk error if a directory cannot be read
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file()
            && let Ok(relative) = entry.path().strip_prefix(root)
        {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

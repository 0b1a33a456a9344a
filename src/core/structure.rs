//! Vault layout checks, run once at configuration load.

use std::fs;
use std::path::Path;

use super::files::ensure_dir_exists;
use super::paths::{VaultPaths, META_DIR, NOTES_DIR, SCREENSHOT_DIR};
use super::schema::{Category, Choice};
use crate::error::{VaultError, VaultResult};

pub const BASE_SUBDIRS: [&str; 3] = [NOTES_DIR, META_DIR, SCREENSHOT_DIR];

/// Check that `path` exists and is a directory.
pub fn validate_dir(path: &Path) -> VaultResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(VaultError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VaultError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(VaultError::io(path, e)),
    }
}

fn require_subdir(parent: &Path, name: &str) -> VaultResult<()> {
    let path = parent.join(name);
    match validate_dir(&path) {
        Err(VaultError::NotFound(_)) => Err(VaultError::MissingSubdir {
            name: name.to_string(),
            path,
        }),
        other => other,
    }
}

/// Fails on the first missing top-level folder (`notes`, `meta`, `screenshots`).
pub fn validate_base_structure(root: &Path) -> VaultResult<()> {
    BASE_SUBDIRS
        .iter()
        .try_for_each(|subdir| require_subdir(root, subdir))
}

/// Fails on the first missing category folder under `notes/`.
pub fn validate_category_structure(notes_dir: &Path) -> VaultResult<()> {
    Category::ALL
        .iter()
        .try_for_each(|category| require_subdir(notes_dir, category.as_str()))
}

/// Create the vault root, the top-level folders and every category folder.
pub fn ensure_structure(paths: &VaultPaths) -> VaultResult<()> {
    ensure_dir_exists(&paths.root)?;
    for (name, path, _) in paths.required_folders() {
        tracing::debug!(subdir = name, path = %path.display(), "ensuring subdirectory");
        ensure_dir_exists(path)?;
    }
    for category in Category::ALL {
        ensure_dir_exists(&paths.notes.join(category.as_str()))?;
    }
    Ok(())
}

//! Path resolution and confinement.
//!
//! Every client-supplied path goes through [`validate_relative`] and then
//! [`build_secure_path`] before any filesystem access. Both checks are
//! lexical: nothing here touches the disk except reading the current
//! working directory.

use std::path::{Component, Path, PathBuf};

use crate::error::{VaultError, VaultResult};

pub const NOTES_DIR: &str = "notes";
pub const META_DIR: &str = "meta";
pub const SCREENSHOT_DIR: &str = "screenshots";

/// Well-known locations inside a vault.
#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub root: PathBuf,
    pub notes: PathBuf,
    pub meta: PathBuf,
    pub screenshots: PathBuf,
}

impl VaultPaths {
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            notes: root.join(NOTES_DIR),
            meta: root.join(META_DIR),
            screenshots: root.join(SCREENSHOT_DIR),
            root,
        }
    }

    /// Top-level folders every vault must have, with their purpose.
    pub fn required_folders(&self) -> Vec<(&'static str, &PathBuf, &'static str)> {
        vec![
            (NOTES_DIR, &self.notes, "Notes by category"),
            (META_DIR, &self.meta, "Reference material"),
            (SCREENSHOT_DIR, &self.screenshots, "Downloaded screenshots"),
        ]
    }

    /// Resolve a client path under `notes/`.
    pub fn note(&self, candidate: &str) -> VaultResult<PathBuf> {
        secure_join(&self.root, NOTES_DIR, candidate)
    }

    /// Resolve a client path under `screenshots/`.
    pub fn screenshot(&self, candidate: &str) -> VaultResult<PathBuf> {
        secure_join(&self.root, SCREENSHOT_DIR, candidate)
    }
}

/// Replace a leading `~` with the home directory.
///
/// Only `~` and `~/...` are expanded; `~user` forms pass through untouched.
pub fn expand_home(path: &str) -> VaultResult<PathBuf> {
    let rest = if path == "~" {
        ""
    } else if let Some(stripped) = path.strip_prefix("~/") {
        stripped
    } else {
        return Ok(PathBuf::from(path));
    };

    let home = dirs::home_dir()
        .ok_or_else(|| VaultError::Resolution("could not determine home directory".into()))?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// Leading `..` components of a relative path are kept, and `..` directly
/// under the root is dropped, matching how the OS would resolve it.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Make `path` absolute against the current directory and clean it.
pub fn absolutize(path: &Path) -> VaultResult<PathBuf> {
    if path.is_absolute() {
        return Ok(clean(path));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| VaultError::Resolution(format!("failed to get current directory: {}", e)))?;
    Ok(clean(&cwd.join(path)))
}

/// Expand `~`, absolutize and clean. Does not check existence.
pub fn resolve_and_clean(path: &str) -> VaultResult<PathBuf> {
    let expanded = expand_home(path)?;
    absolutize(&expanded)
}

/// Validate an untrusted relative path and return its cleaned form.
pub fn validate_relative(candidate: &str) -> VaultResult<PathBuf> {
    if candidate.is_empty() {
        return Err(VaultError::invalid_path(candidate, "path cannot be empty"));
    }
    if candidate.contains('\0') {
        return Err(VaultError::invalid_path(candidate, "path contains a null byte"));
    }

    let raw = Path::new(candidate);
    if raw.is_absolute() || raw.has_root() {
        return Err(VaultError::invalid_path(candidate, "absolute paths are not allowed"));
    }
    if raw.components().any(|c| c == Component::ParentDir) {
        return Err(VaultError::invalid_path(candidate, "parent directory segments are not allowed"));
    }

    let cleaned = clean(raw);
    match cleaned.components().next() {
        Some(Component::ParentDir) => Err(VaultError::invalid_path(
            candidate,
            "path escapes its directory",
        )),
        Some(Component::CurDir) | None => {
            Err(VaultError::invalid_path(candidate, "path does not name a file"))
        }
        _ => Ok(cleaned),
    }
}

/// Join `vault_root/subdir/clean_relative` and prove the result stays under
/// `vault_root/subdir`.
///
/// The containment test compares path components, so a sibling such as
/// `notes-archive` never counts as being inside `notes`.
pub fn build_secure_path(
    vault_root: &Path,
    subdir: &str,
    clean_relative: &Path,
) -> VaultResult<PathBuf> {
    let base_dir = vault_root.join(subdir);
    let full_path = base_dir.join(clean_relative);

    let abs_base = absolutize(&base_dir)?;
    let abs_full = absolutize(&full_path)?;

    if !abs_full.starts_with(&abs_base) {
        tracing::warn!(
            candidate = %clean_relative.display(),
            base = %abs_base.display(),
            "path escapes its base directory"
        );
        return Err(VaultError::AccessDenied(
            clean_relative.display().to_string(),
        ));
    }

    Ok(full_path)
}

/// [`validate_relative`] followed by [`build_secure_path`].
pub fn secure_join(vault_root: &Path, subdir: &str, candidate: &str) -> VaultResult<PathBuf> {
    let cleaned = validate_relative(candidate).map_err(|e| {
        tracing::warn!(path = candidate, error = %e, "rejected client path");
        e
    })?;
    build_secure_path(vault_root, subdir, &cleaned)
}

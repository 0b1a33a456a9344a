use std::fs;
use std::path::{Path, PathBuf};

use super::Store;
use crate::core::files::ensure_dir_exists;
use crate::core::paths::{build_secure_path, validate_relative, VaultPaths};
use crate::error::{IoResultExt, VaultError, VaultResult};

/// Where downloaded originals are moved inside the inbox.
pub const ARCHIVE_DIR: &str = "downloaded_screenshots";

/// A [`Store`] backed by a local inbox directory.
///
/// Only files directly inside the inbox count; subfolders (including the
/// archive) and hidden files are ignored.
pub struct FolderStore {
    inbox: PathBuf,
    vault: VaultPaths,
}

impl FolderStore {
    pub fn new(inbox: PathBuf, vault: VaultPaths) -> VaultResult<Self> {
        crate::core::structure::validate_dir(&inbox)
            .map_err(|e| VaultError::Store(format!("screenshot inbox unavailable: {}", e)))?;
        Ok(Self { inbox, vault })
    }

    pub fn inbox(&self) -> &Path {
        &self.inbox
    }

    fn inbox_file(&self, name: &str) -> VaultResult<PathBuf> {
        let clean = validate_relative(name)?;
        if clean.components().count() != 1 {
            return Err(VaultError::invalid_path(
                name,
                "screenshot names must not contain folders",
            ));
        }
        build_secure_path(&self.inbox, "", &clean)
    }

    /// Copy one inbox file into the vault, then archive the original.
    fn fetch_one(&self, file_name: &str) -> VaultResult<()> {
        let source = self.inbox_file(file_name)?;
        let dest = self.vault.screenshot(file_name)?;
        fs::copy(&source, &dest).with_path(&dest)?;
        self.move_file(file_name, ARCHIVE_DIR)?;
        tracing::info!(file = %file_name, dest = %dest.display(), "downloaded screenshot");
        Ok(())
    }

    fn pending(&self) -> VaultResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.inbox).with_path(&self.inbox)? {
            let entry = entry.with_path(&self.inbox)?;
            let file_type = entry.file_type().with_path(entry.path())?;
            let name = entry.file_name().to_string_lossy().to_string();
            if file_type.is_file() && !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

impl Store for FolderStore {
    fn get_files(&self, name: &str) -> VaultResult<Vec<String>> {
        let wanted = if name.is_empty() {
            self.pending()?
        } else {
            let source = self.inbox_file(name)?;
            if !source.is_file() {
                return Err(VaultError::NotFound(format!(
                    "'{}' in screenshot inbox",
                    name
                )));
            }
            vec![name.to_string()]
        };

        if wanted.is_empty() {
            return Err(VaultError::NotFound("no files in screenshot inbox".into()));
        }

        ensure_dir_exists(&self.vault.screenshots)?;

        let total = wanted.len();
        let mut fetched = Vec::with_capacity(total);
        let mut failed = Vec::new();
        for file_name in wanted {
            match self.fetch_one(&file_name) {
                Ok(()) => fetched.push(file_name),
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "screenshot download failed");
                    failed.push(format!("{}: {}", file_name, e));
                }
            }
        }

        if failed.is_empty() {
            return Ok(fetched);
        }
        Err(VaultError::Store(format!(
            "downloaded {} of {} file(s) [{}]; failed: {}",
            fetched.len(),
            total,
            fetched.join(", "),
            failed.join("; ")
        )))
    }

    fn list_files(&self) -> VaultResult<Vec<String>> {
        self.pending()
    }

    fn move_file(&self, id: &str, dest_folder: &str) -> VaultResult<()> {
        let source = self.inbox_file(id)?;
        let folder = validate_relative(dest_folder)?;
        let dest = build_secure_path(&self.inbox, &folder.to_string_lossy(), Path::new(id))?;

        if let Some(parent) = dest.parent() {
            ensure_dir_exists(parent)?;
        }
        fs::rename(&source, &dest).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                VaultError::NotFound(format!("'{}' in screenshot inbox", id))
            }
            _ => VaultError::io(&source, e),
        })
    }
}

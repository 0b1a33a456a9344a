//! Remote screenshot storage.
//!
//! The server only needs three operations from wherever screenshots are
//! captured; [`Store`] names them. [`FolderStore`] implements them over a
//! local inbox folder such as a synced cloud-drive directory.

mod folder;

pub use folder::{FolderStore, ARCHIVE_DIR};

use crate::error::VaultResult;

pub trait Store: Send + Sync {
    /// Fetch `name` (or every file when `name` is empty) into the vault's
    /// screenshots folder and archive the originals. Returns the file names.
    fn get_files(&self, name: &str) -> VaultResult<Vec<String>>;

    /// Names of the files currently waiting in the store.
    fn list_files(&self) -> VaultResult<Vec<String>>;

    /// Move the file `id` into `dest_folder` inside the store.
    fn move_file(&self, id: &str, dest_folder: &str) -> VaultResult<()>;
}

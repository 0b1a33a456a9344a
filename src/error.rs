use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by vault operations.
///
/// Every variant renders as user-facing text; the MCP layer forwards the
/// `Display` output to the client as a tool error.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("failed to resolve path: {0}")]
    Resolution(String),

    #[error("invalid path '{path}': {reason}. Must be a relative path within the vault")]
    InvalidPath { path: String, reason: String },

    #[error("access denied: path '{0}' is outside the allowed directory")]
    AccessDenied(String),

    #[error("required subdirectory '{name}' is missing ({})", path.display())]
    MissingSubdir { name: String, path: PathBuf },

    #[error("path '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("file already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("content rejected: {0}")]
    ContentRejected(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Attach a path to `std::io::Result`s.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> VaultResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> VaultResult<T> {
        self.map_err(|e| VaultError::io(path, e))
    }
}

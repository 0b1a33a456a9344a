//! blueprince-mcp library
//!
//! Spoiler-free Blue Prince notebook kept in an Obsidian vault.
//!
//! # Modules
//!
//! - `core`: Path confinement, vault layout, note codec and note storage
//! - `storage`: Screenshot inbox behind the `Store` trait
//! - `config`: YAML config, env overrides, backup-on-write edits
//! - `mcp`: MCP server exposing notes and screenshots (feature `mcp`)

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod storage;

// Re-exports for convenience
pub use config::{Config, VaultConfig};
pub use core::frontmatter::{NoteDocument, NoteMetadata};
pub use core::note::Note;
pub use core::paths::{build_secure_path, validate_relative, VaultPaths};
pub use core::schema::{Category, Choice, Confidence, Status};
pub use error::{VaultError, VaultResult};
pub use storage::{FolderStore, Store};

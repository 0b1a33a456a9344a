//! Vault primitives: path confinement, layout, note codec and storage.

pub mod files;
pub mod frontmatter;
pub mod guard;
pub mod image;
pub mod note;
pub mod paths;
pub mod schema;
pub mod structure;

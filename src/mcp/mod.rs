//! MCP server for the Blue Prince notes vault
//!
//! Exposes note CRUD and screenshot tools, the vault's text files as
//! resources, and the spoiler protection rules.

mod rules;
mod server;

pub use server::{run_mcp_server, VaultService, SERVER_NAME, SERVER_VERSION};

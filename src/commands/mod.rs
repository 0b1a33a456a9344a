pub mod init;
pub mod list;
pub mod read;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use blueprince_mcp::config::{Config, VaultConfig, SCREENSHOT_INBOX_ENV, VAULT_PATH_ENV};

/// Where the vault and screenshot inbox come from. Flags and env vars win
/// over the config file.
#[derive(Args, Debug, Clone)]
pub struct VaultArgs {
    #[arg(long, global = true, help = "Config file (default: ~/.blueprince_mcp/config.yaml)")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, env = VAULT_PATH_ENV, help = "Obsidian vault root")]
    pub vault: Option<String>,
    #[arg(long, global = true, env = SCREENSHOT_INBOX_ENV, help = "Folder where new screenshots arrive")]
    pub screenshot_inbox: Option<String>,
}

impl VaultArgs {
    pub fn config(&self) -> Result<Config> {
        Ok(Config::load(
            self.config.as_deref(),
            self.vault.clone(),
            self.screenshot_inbox.clone(),
        )?)
    }

    pub fn load(&self) -> Result<VaultConfig> {
        Ok(self.config()?.validate()?)
    }
}

use anyhow::{bail, Result};
use colored::*;
use std::fs;
use std::path::PathBuf;

use blueprince_mcp::config::{
    default_config_path, update_claude_desktop_env, update_yaml_field, Config,
    CLAUDE_SERVER_NAME, SCREENSHOT_INBOX_FIELD, VAULT_PATH_ENV, VAULT_PATH_FIELD,
};
use blueprince_mcp::core::paths::{resolve_and_clean, VaultPaths};
use blueprince_mcp::core::schema::{Category, Choice};

use super::VaultArgs;

pub fn run(args: &VaultArgs, vault: Option<String>, claude_config: Option<PathBuf>) -> Result<()> {
    let raw = match vault.or_else(|| args.vault.clone()) {
        Some(v) => v,
        None => std::env::current_dir()?.to_string_lossy().to_string(),
    };
    let root = resolve_and_clean(&raw)?;
    if root.parent().is_none() {
        bail!("refusing to use '{}' as the vault root", root.display());
    }
    let paths = VaultPaths::from_root(root.clone());

    println!("{}", "Blue Prince Vault Setup".bold());
    println!("{}", "=".repeat(50));
    println!();
    println!("Vault: {}", root.display().to_string().cyan());
    println!();

    let mut created = 0;

    println!("{}", "Checking required folders...".cyan());
    println!();

    let mut folders: Vec<(String, PathBuf, String)> = paths
        .required_folders()
        .into_iter()
        .map(|(name, path, purpose)| (name.to_string(), path.clone(), purpose.to_string()))
        .collect();
    folders.extend(Category::ALL.iter().map(|c| {
        (
            format!("notes/{}", c.as_str()),
            paths.notes.join(c.as_str()),
            format!("{} notes", c.as_str()),
        )
    }));

    for (name, path, purpose) in &folders {
        if path.is_dir() {
            println!("{} {} exists ({})", "✓".green(), name, purpose);
        } else {
            fs::create_dir_all(path)?;
            created += 1;
            println!("{} Created {} ({})", "✓".green(), name, purpose);
        }
    }

    println!();
    println!("{}", "Writing configuration...".cyan());
    println!();

    let config_path = match &args.config {
        Some(p) => p.clone(),
        None => default_config_path()?,
    };
    let root_str = root.display().to_string();
    update_yaml_field(&config_path, VAULT_PATH_FIELD, &root_str)?;
    if let Some(inbox) = &args.screenshot_inbox {
        update_yaml_field(&config_path, SCREENSHOT_INBOX_FIELD, inbox)?;
    }
    println!("{} Updated {}", "✓".green(), config_path.display());

    if let Some(claude) = &claude_config {
        update_claude_desktop_env(claude, CLAUDE_SERVER_NAME, VAULT_PATH_ENV, &root_str)?;
        println!(
            "{} Set {} for '{}' in {}",
            "✓".green(),
            VAULT_PATH_ENV,
            CLAUDE_SERVER_NAME,
            claude.display()
        );
    }

    Config::from_file(&config_path)?.validate()?;

    println!();
    println!("{}", "Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Created: {} folders", created.to_string().green());
    println!();
    println!("{}", "✓ Vault is ready!".green());

    Ok(())
}

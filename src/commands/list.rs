use anyhow::Result;
use colored::*;

use blueprince_mcp::core::note;

use super::VaultArgs;

pub fn run(args: &VaultArgs, json: bool) -> Result<()> {
    let vault = args.load()?;
    let notes = note::list(&vault.paths)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("{}", "No notes yet.".dimmed());
        return Ok(());
    }
    for path in &notes {
        println!("{}", path);
    }
    println!();
    println!("{} notes", notes.len().to_string().bold());

    Ok(())
}

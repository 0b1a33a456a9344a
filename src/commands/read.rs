use anyhow::Result;

use blueprince_mcp::core::note;

use super::VaultArgs;

pub fn run(args: &VaultArgs, path: &str) -> Result<()> {
    let vault = args.load()?;
    print!("{}", note::read(&vault.paths, path)?);
    Ok(())
}

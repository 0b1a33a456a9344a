mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::VaultArgs;

#[derive(Parser)]
#[command(name = "blueprince")]
#[command(about = "Spoiler-free Blue Prince notes in an Obsidian vault, served over MCP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    vault: VaultArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vault folders and point the config at them
    Init {
        #[arg(help = "Vault root (default: --vault or the current directory)")]
        path: Option<String>,
        #[arg(long, help = "Also set OBSIDIAN_VAULT_PATH in this Claude Desktop config")]
        claude_config: Option<PathBuf>,
    },
    /// Check vault structure and every note
    Validate {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List notes
    List {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Print a note
    Read {
        #[arg(help = "Path relative to the notes folder")]
        path: String,
    },

    // ===== MCP Server =====
    /// Start MCP server for Claude integration
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show Claude configuration instructions")]
        install: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.command {
        #[cfg(feature = "mcp")]
        Commands::Mcp { install: false } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    blueprince_mcp::logging::init_tracing(level)?;

    match cli.command {
        Commands::Init {
            path,
            claude_config,
        } => commands::init::run(&cli.vault, path, claude_config),
        Commands::Validate { json } => commands::validate::run(&cli.vault, json),
        Commands::List { json } => commands::list::run(&cli.vault, json),
        Commands::Read { path } => commands::read::run(&cli.vault, &path),

        // MCP Server
        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions(&cli.vault);
                Ok(())
            } else {
                run_mcp_server(&cli.vault)
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server(args: &VaultArgs) -> anyhow::Result<()> {
    let config = args.load()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(blueprince_mcp::mcp::run_mcp_server(config))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions(args: &VaultArgs) {
    use blueprince_mcp::config::{CLAUDE_SERVER_NAME, PLACEHOLDER_VAULT_PATH, VAULT_PATH_ENV};
    use colored::Colorize;

    let vault_path = args
        .config()
        .ok()
        .map(|c| c.vault_path)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_VAULT_PATH.to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "blueprince".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your Claude configuration:");
    println!();
    println!("{}", "For Claude Desktop (claude_desktop_config.json):".dimmed());
    println!(r#"{{
  "mcpServers": {{
    "{}": {{
      "command": "{}",
      "args": ["mcp"],
      "env": {{
        "{}": "{}"
      }}
    }}
  }}
}}"#, CLAUDE_SERVER_NAME, binary_path, VAULT_PATH_ENV, vault_path);
    println!();
    println!(
        "{}",
        "Tip: `blueprince init <vault> --claude-config <file>` sets the env var for you.".dimmed()
    );
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - List all notes", "list_notes".green());
    println!("  • {} - Create a note from the user's observations", "create_note".green());
    println!("  • {} - Read a note", "read_note".green());
    println!("  • {} - Replace a note's metadata and content", "update_note".green());
    println!("  • {} - Delete a note", "delete_note".green());
    println!("  • {} - List local or inbox screenshots", "list_screenshots".green());
    println!("  • {} - Pull screenshots from the inbox", "download_screenshots".green());
    println!("  • {} - Preview a screenshot", "view_screenshot".green());
    println!("  • {} - Screenshot as a data URI", "analyze_screenshot".green());
}

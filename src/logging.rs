//! Tracing setup.
//!
//! Logs always go to stderr: stdout carries the MCP protocol when serving
//! and the report output of the CLI commands otherwise.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target prefix of every event this crate emits.
pub const LOG_TARGET: &str = "blueprince_mcp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// `LOG_FORMAT=json` selects JSON lines; anything else is plain text.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Directive added to whatever `RUST_LOG` holds, for this crate's events.
pub fn crate_directive(level: Level) -> String {
    format!("{}={}", LOG_TARGET, level.to_string().to_ascii_lowercase())
}

/// Install the global subscriber. The server logs at `info`; the report
/// commands pass `warn` so stderr stays quiet unless something goes wrong.
pub fn init_tracing(level: Level) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(crate_directive(level).parse()?);
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt.json()).try_init()?,
        LogFormat::Text => registry.with(fmt.with_ansi(false)).try_init()?,
    }

    Ok(())
}

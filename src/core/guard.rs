//! Rejects note bodies that carry assistant-invented investigation sections.
//!
//! Notes must hold only what the player observed; section headers like
//! "## Next Steps" are the usual shape of added speculation.

use crate::error::{VaultError, VaultResult};

const INVESTIGATION_HEADERS: &[&str] = &[
    "## analysis",
    "## investigation",
    "## questions",
    "## next steps",
    "## follow-up",
    "## theories",
    "## connections",
    "## clues",
    "## mysteries",
    "## research",
    "### investigation",
    "### questions",
    "### analysis",
    "### theories",
];

pub fn check_content(body: &str) -> VaultResult<()> {
    let lower = body.to_lowercase();

    match INVESTIGATION_HEADERS.iter().find(|h| lower.contains(*h)) {
        Some(header) => Err(VaultError::ContentRejected(format!(
            "content contains investigation section header '{}'. \
             Provide only the user's direct observations without added analysis or investigation prompts",
            header
        ))),
        None => Ok(()),
    }
}

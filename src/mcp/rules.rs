pub const RULES_URI: &str = "rules://blue-prince/spoiler-protection";
pub const RULES_NAME: &str = "Blue Prince Spoiler Protection Rules";
pub const RULES_DESCRIPTION: &str =
    "Rules for spoiler-free Blue Prince assistance that the assistant must follow at all times";

pub const SPOILER_RULES: &str = r#"# Blue Prince Notes - Spoiler Protection Rules

This server keeps a player's own Blue Prince notes. Its purpose is to preserve
their discovery of the game. Follow these rules strictly.

## Sources

- The player's notes, read through this server, are the primary source.
- Outside knowledge (training data, wikis, guides, web search) may only add
  context to things the player has already written down.
- Before searching the web, check whether the query touches names, rooms,
  items or people already in the notes. Keep only results that match what the
  notes already contain.
- If outside information could spoil something, say so and ask before sharing
  it. Only search after an explicit "yes".

## Never

- Solve puzzles the player has not solved.
- Reveal story, people or rooms the player has not found.
- Suggest what to investigate next unless asked.
- Add analysis sections, theories or "questions to investigate" to a note.
- Invent information or speculate about undiscovered areas.

## Writing notes

- Use the player's own words and observations as the note content.
- Keep their uncertainty ("weird", "maybe", "?") intact.
- Mark any outside context clearly, and never let it reach past what the
  player has noted.
- When updating, read the existing note first and merge the new observations
  into it.

## Allowed

- Organising, tagging and categorising existing notes.
- Searching the player's documented discoveries.
- Pointing out connections the player has already made.
"#;

use anyhow::Result;
use colored::*;
use serde::Serialize;

use blueprince_mcp::core::guard::check_content;
use blueprince_mcp::core::note::{collect_all_notes, Note};
use blueprince_mcp::VaultConfig;

use super::VaultArgs;

#[derive(Serialize)]
struct ValidationResult {
    vault: String,
    structure_error: Option<String>,
    total_files: usize,
    parse_errors: usize,
    folder_mismatches: usize,
    content_warnings: usize,
    files_with_errors: Vec<FileError>,
}

#[derive(Serialize)]
struct FileError {
    file: String,
    errors: Vec<String>,
}

impl ValidationResult {
    fn has_errors(&self) -> bool {
        self.structure_error.is_some()
            || self.parse_errors > 0
            || self.folder_mismatches > 0
            || self.content_warnings > 0
    }
}

pub fn run(args: &VaultArgs, json: bool) -> Result<()> {
    let config = args.config()?;
    let mut result = ValidationResult {
        vault: config.vault_path.clone(),
        structure_error: None,
        total_files: 0,
        parse_errors: 0,
        folder_mismatches: 0,
        content_warnings: 0,
        files_with_errors: Vec::new(),
    };

    match config.validate() {
        Ok(vault) => check_notes(&vault, &mut result)?,
        Err(e) => result.structure_error = Some(e.to_string()),
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn check_notes(vault: &VaultConfig, result: &mut ValidationResult) -> Result<()> {
    let (notes, failures) = collect_all_notes(&vault.paths)?;
    result.total_files = notes.len() + failures.len();

    for (file, err) in failures {
        result.parse_errors += 1;
        result.files_with_errors.push(FileError {
            file,
            errors: vec![format!("[PARSE] {}", err)],
        });
    }

    for note in &notes {
        let errors = check_note(note, result);
        if !errors.is_empty() {
            result.files_with_errors.push(FileError {
                file: note.relative.clone(),
                errors,
            });
        }
    }

    result.files_with_errors.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(())
}

fn check_note(note: &Note, result: &mut ValidationResult) -> Vec<String> {
    let mut errors = Vec::new();

    if !note.in_category_folder() {
        let folder = match note.folder() {
            "" => "the notes root".to_string(),
            f => format!("notes/{}", f),
        };
        errors.push(format!(
            "[FOLDER] category='{}' should not be in {}",
            note.metadata().category,
            folder
        ));
        result.folder_mismatches += 1;
    }

    if let Err(e) = check_content(&note.document.body) {
        errors.push(format!("[CONTENT] {}", e));
        result.content_warnings += 1;
    }

    errors
}

fn count(n: usize) -> ColoredString {
    if n > 0 {
        n.to_string().red()
    } else {
        n.to_string().green()
    }
}

fn print_report(result: &ValidationResult) {
    println!("{}", "Vault Validation Report".bold());
    println!("{}", "=".repeat(60));
    println!();
    println!("Vault: {}", result.vault);

    if let Some(err) = &result.structure_error {
        println!();
        println!("{} {}", "✗ Structure:".red().bold(), err);
        println!("{}", "Run `blueprince init` to create missing folders.".yellow());
        return;
    }
    println!("{}", "✓ Structure is valid".green());
    println!("Total notes: {}", result.total_files);
    println!();

    if result.files_with_errors.is_empty() {
        println!("{}", "✓ No violations found!".green());
        return;
    }

    println!("{}", "Violations:".red().bold());
    println!("{}", "-".repeat(60));

    for file_err in &result.files_with_errors {
        println!();
        println!("{} {}", "FILE:".cyan(), file_err.file);
        for err in &file_err.errors {
            println!("  {} {}", "•".red(), err);
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  Parse errors: {}", count(result.parse_errors));
    println!("  Folder mismatches: {}", count(result.folder_mismatches));
    println!("  Content warnings: {}", count(result.content_warnings));
}

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};

use super::files::{ensure_dir_exists, list_files};
use super::frontmatter::{decode, encode, NoteDocument, NoteMetadata};
use super::paths::VaultPaths;
use crate::error::{VaultError, VaultResult};

/// A note file on disk, addressed by its path relative to `notes/`.
pub struct Note {
    pub path: PathBuf,
    pub relative: String,
    pub document: NoteDocument,
}

impl Note {
    pub fn load(paths: &VaultPaths, relative: &str) -> VaultResult<Self> {
        let path = paths.note(relative)?;
        let content = read_existing(&path, relative)?;
        Ok(Self {
            path,
            relative: relative.to_string(),
            document: decode(&content)?,
        })
    }

    pub fn metadata(&self) -> &NoteMetadata {
        &self.document.metadata
    }

    /// Category folder the file actually lives in; empty for a note stored
    /// directly in `notes/`.
    pub fn folder(&self) -> &str {
        let mut components = Path::new(&self.relative).components();
        match (components.next(), components.next()) {
            (Some(first), Some(_)) => first.as_os_str().to_str().unwrap_or(""),
            _ => "",
        }
    }

    /// Whether the file sits in the folder matching its `category`.
    pub fn in_category_folder(&self) -> bool {
        self.folder() == self.metadata().category.to_string()
    }
}

fn now_rfc3339() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Hidden sibling used to stage a write: `people/.simon.md.tmp`.
fn staging_path(full_path: &Path) -> PathBuf {
    let name = full_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    full_path.with_file_name(format!(".{}.tmp", name))
}

/// Write `content` to the staging file. Nothing is left behind on failure.
fn stage(full_path: &Path, content: &str) -> VaultResult<PathBuf> {
    let staged = staging_path(full_path);
    if let Err(e) = fs::write(&staged, content) {
        let _ = fs::remove_file(&staged);
        return Err(VaultError::io(&staged, e));
    }
    Ok(staged)
}

fn read_existing(path: &Path, relative: &str) -> VaultResult<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VaultError::NotFound(format!("note '{}'", relative)),
        _ => VaultError::io(path, e),
    })
}

/// Create a new note. Fails if a file already exists at `relative`.
pub fn create(
    paths: &VaultPaths,
    relative: &str,
    mut metadata: NoteMetadata,
    body: &str,
) -> VaultResult<PathBuf> {
    let full_path = paths.note(relative)?;

    if let Some(dir) = full_path.parent() {
        ensure_dir_exists(dir)?;
    }

    let now = now_rfc3339();
    metadata.created_at = Some(now.clone());
    metadata.updated_at = Some(now);
    let content = encode(&metadata, body)?;

    if full_path.exists() {
        return Err(VaultError::AlreadyExists(relative.to_string()));
    }

    // hard_link refuses an existing target, so the note appears complete or not at all
    let staged = stage(&full_path, &content)?;
    let linked = fs::hard_link(&staged, &full_path);
    let _ = fs::remove_file(&staged);
    linked.map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => VaultError::AlreadyExists(relative.to_string()),
        _ => VaultError::io(&full_path, e),
    })?;

    tracing::info!(path = relative, category = %metadata.category, "created note");
    Ok(full_path)
}

/// Raw file content of an existing note.
pub fn read(paths: &VaultPaths, relative: &str) -> VaultResult<String> {
    let full_path = paths.note(relative)?;
    let content = read_existing(&full_path, relative)?;
    tracing::info!(path = relative, "read note");
    Ok(content)
}

/// Replace an existing note. `created_at` is carried over from the file on
/// disk when it has one.
pub fn update(
    paths: &VaultPaths,
    relative: &str,
    mut metadata: NoteMetadata,
    body: &str,
) -> VaultResult<PathBuf> {
    let full_path = paths.note(relative)?;
    let existing = read_existing(&full_path, relative)?;

    let previous_created = decode(&existing)
        .ok()
        .and_then(|doc| doc.metadata.created_at);
    let now = now_rfc3339();
    metadata.created_at = previous_created
        .or(metadata.created_at)
        .or_else(|| Some(now.clone()));
    metadata.updated_at = Some(now);

    let content = encode(&metadata, body)?;
    let staged = stage(&full_path, &content)?;
    if let Err(e) = fs::rename(&staged, &full_path) {
        let _ = fs::remove_file(&staged);
        return Err(VaultError::io(&full_path, e));
    }

    tracing::info!(path = relative, category = %metadata.category, "updated note");
    Ok(full_path)
}

pub fn delete(paths: &VaultPaths, relative: &str) -> VaultResult<()> {
    let full_path = paths.note(relative)?;
    fs::remove_file(&full_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VaultError::NotFound(format!("note '{}'", relative)),
        _ => VaultError::io(&full_path, e),
    })?;

    tracing::info!(path = relative, "deleted note");
    Ok(())
}

/// Every note file, relative to `notes/`, with forward slashes.
pub fn list(paths: &VaultPaths) -> VaultResult<Vec<String>> {
    Ok(list_files(&paths.notes)?
        .into_iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect())
}

/// Load every note that parses; files that don't are returned with their
/// error so callers can report them.
pub fn collect_all_notes(paths: &VaultPaths) -> VaultResult<(Vec<Note>, Vec<(String, VaultError)>)> {
    let mut notes = Vec::new();
    let mut failures = Vec::new();

    for relative in list(paths)? {
        if !relative.ends_with(".md") {
            continue;
        }
        match Note::load(paths, &relative) {
            Ok(note) => notes.push(note),
            Err(e) => failures.push((relative, e)),
        }
    }

    Ok((notes, failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Category, Confidence, Status};
    use crate::core::structure::ensure_structure;

    fn vault() -> (tempfile::TempDir, VaultPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = VaultPaths::from_root(dir.path().to_path_buf());
        ensure_structure(&paths).unwrap();
        (dir, paths)
    }

    fn metadata(category: Category) -> NoteMetadata {
        NoteMetadata {
            title: "Simon P. Jones".to_string(),
            category,
            primary_subject: "simon_jones".to_string(),
            tags: vec!["people".into(), "simon_jones".into()],
            confidence: Confidence::High,
            status: Status::Confirmed,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_create_writes_under_notes() {
        let (_dir, paths) = vault();
        let full = create(&paths, "people/simon.md", metadata(Category::People), "# Simon").unwrap();

        assert_eq!(full, paths.root.join("notes/people/simon.md"));
        let content = fs::read_to_string(&full).unwrap();
        assert!(content.contains("category: people"));
        assert!(content.contains("created_at:"));
        assert!(content.ends_with("# Simon"));
    }

    #[test]
    fn test_create_twice_fails() {
        let (_dir, paths) = vault();
        create(&paths, "people/simon.md", metadata(Category::People), "a").unwrap();
        let err = create(&paths, "people/simon.md", metadata(Category::People), "b").unwrap_err();
        assert!(matches!(err, VaultError::AlreadyExists(_)));
        assert!(read(&paths, "people/simon.md").unwrap().ends_with("a"));
    }

    #[test]
    fn test_create_makes_missing_folders() {
        let (_dir, paths) = vault();
        create(&paths, "rooms/east_wing/nook.md", metadata(Category::Rooms), "x").unwrap();
        assert!(paths.notes.join("rooms/east_wing/nook.md").is_file());
    }

    #[test]
    fn test_update_missing_note() {
        let (_dir, paths) = vault();
        let err = update(&paths, "people/ghost.md", metadata(Category::People), "boo").unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
        assert!(!paths.notes.join("people/ghost.md").exists());
    }

    #[test]
    fn test_update_preserves_created_at() {
        let (_dir, paths) = vault();
        create(&paths, "people/simon.md", metadata(Category::People), "v1").unwrap();
        let created = Note::load(&paths, "people/simon.md")
            .unwrap()
            .metadata()
            .created_at
            .clone();

        let mut changed = metadata(Category::People);
        changed.created_at = Some("1999-01-01T00:00:00+00:00".to_string());
        changed.status = Status::Theory;
        update(&paths, "people/simon.md", changed, "v2").unwrap();

        let note = Note::load(&paths, "people/simon.md").unwrap();
        assert_eq!(note.metadata().created_at, created);
        assert_eq!(note.metadata().status, Status::Theory);
        assert!(note.metadata().updated_at.is_some());
        assert_eq!(note.document.body, "v2");
    }

    #[test]
    fn test_read_rejects_traversal_without_io() {
        let (_dir, paths) = vault();
        let err = read(&paths, "../../../etc/passwd").unwrap_err();
        assert!(matches!(err, VaultError::InvalidPath { .. }));
    }

    #[test]
    fn test_delete_lifecycle() {
        let (_dir, paths) = vault();
        create(&paths, "lore/crest.md", metadata(Category::Lore), "x").unwrap();
        delete(&paths, "lore/crest.md").unwrap();

        assert!(matches!(delete(&paths, "lore/crest.md"), Err(VaultError::NotFound(_))));
        assert!(matches!(read(&paths, "lore/crest.md"), Err(VaultError::NotFound(_))));
        // Deleted is terminal only for that file: the path can be created again
        create(&paths, "lore/crest.md", metadata(Category::Lore), "y").unwrap();
    }

    #[test]
    fn test_list_and_collect() {
        let (_dir, paths) = vault();
        create(&paths, "people/simon.md", metadata(Category::People), "x").unwrap();
        create(&paths, "rooms/nook.md", metadata(Category::People), "y").unwrap();
        fs::write(paths.notes.join("general/broken.md"), "no frontmatter").unwrap();

        let listed = list(&paths).unwrap();
        assert_eq!(
            listed,
            vec!["general/broken.md", "people/simon.md", "rooms/nook.md"]
        );

        let (notes, failures) = collect_all_notes(&paths).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "general/broken.md");

        let misplaced: Vec<_> = notes.iter().filter(|n| !n.in_category_folder()).collect();
        assert_eq!(misplaced.len(), 1);
        assert_eq!(misplaced[0].folder(), "rooms");
    }

    #[test]
    fn test_failed_create_leaves_nothing_behind() {
        let (_dir, paths) = vault();
        let blocker = paths.notes.join("lore/.big.md.tmp");
        fs::create_dir(&blocker).unwrap();

        let err = create(&paths, "lore/big.md", metadata(Category::Lore), "x").unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
        assert!(!paths.notes.join("lore/big.md").exists());

        fs::remove_dir(&blocker).unwrap();
        create(&paths, "lore/big.md", metadata(Category::Lore), "x").unwrap();
        assert_eq!(list(&paths).unwrap(), vec!["lore/big.md"]);
    }

    #[test]
    fn test_failed_update_keeps_original() {
        let (_dir, paths) = vault();
        create(&paths, "people/simon.md", metadata(Category::People), "original").unwrap();
        fs::create_dir(paths.notes.join("people/.simon.md.tmp")).unwrap();

        let err = update(&paths, "people/simon.md", metadata(Category::People), "new").unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
        assert!(read(&paths, "people/simon.md").unwrap().ends_with("original"));
    }

    #[test]
    fn test_update_leaves_no_staging_file() {
        let (_dir, paths) = vault();
        create(&paths, "people/simon.md", metadata(Category::People), "v1").unwrap();
        update(&paths, "people/simon.md", metadata(Category::People), "v2").unwrap();
        assert!(!paths.notes.join("people/.simon.md.tmp").exists());
    }

    #[test]
    fn test_folder_of_top_level_note_is_empty() {
        let (_dir, paths) = vault();
        create(&paths, "simon.md", metadata(Category::People), "x").unwrap();

        let note = Note::load(&paths, "simon.md").unwrap();
        assert_eq!(note.folder(), "");
        assert!(!note.in_category_folder());
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{IoResultExt, VaultError, VaultResult};

/// Hidden files and folders (`.obsidian`, `.DS_Store`, ...) are never exposed.
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

/// All non-hidden files under `root`, as paths relative to `root`, sorted.
pub fn list_files(root: &Path) -> VaultResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => VaultError::io(path, io),
                None => VaultError::Resolution(format!(
                    "filesystem loop while walking '{}'",
                    path.display()
                )),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Create `path` (and parents) if it does not exist yet.
pub fn ensure_dir_exists(path: &Path) -> VaultResult<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).with_path(path)
}

/// Best-effort MIME type from the file extension.
pub fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "md" | "markdown" => "text/markdown; charset=utf-8",
        "txt" | "log" | "conf" | "cfg" | "ini" | "yaml" | "yml" | "toml" => {
            "text/plain; charset=utf-8"
        }
        "json" => "application/json",
        "csv" => "text/csv; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn is_text_mime(mime: &str) -> bool {
    mime.starts_with("text/") || mime == "application/json"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        for file in ["file1.txt", "file2.md", "subdir/file3.txt", "subdir/nested/file5.md"] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "test content").unwrap();
        }
        for hidden in [".hidden_file", ".hidden_dir/file.txt", "subdir/.obsidian/ws.json"] {
            let path = root.join(hidden);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "hidden").unwrap();
        }

        let files = list_files(root).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("file1.txt"),
                PathBuf::from("file2.md"),
                PathBuf::from("subdir/file3.txt"),
                PathBuf::from("subdir/nested/file5.md"),
            ]
        );
    }

    #[test]
    fn test_list_files_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
    }

    #[test]
    fn test_ensure_dir_exists_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c");
        ensure_dir_exists(&target).unwrap();
        ensure_dir_exists(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type(Path::new("notes/a.md")), "text/markdown; charset=utf-8");
        assert_eq!(mime_type(Path::new("x.YAML")), "text/plain; charset=utf-8");
        assert_eq!(mime_type(Path::new("shot.PNG")), "image/png");
        assert_eq!(mime_type(Path::new("noext")), "application/octet-stream");
        assert!(is_text_mime(mime_type(Path::new("a.md"))));
        assert!(!is_text_mime(mime_type(Path::new("a.jpg"))));
    }
}

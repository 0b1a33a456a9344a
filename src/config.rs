//! Configuration loading and backup-on-write config edits.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::core::paths::{expand_home, resolve_and_clean, VaultPaths};
use crate::core::structure::{validate_base_structure, validate_category_structure, validate_dir};
use crate::error::{IoResultExt, VaultError, VaultResult};

pub const CONFIG_DIR: &str = ".blueprince_mcp";
pub const CONFIG_FILE: &str = "config.yaml";
pub const PLACEHOLDER_VAULT_PATH: &str = "/path/to/your/obsidian/vault";

pub const VAULT_PATH_FIELD: &str = "vault_path";
pub const SCREENSHOT_INBOX_FIELD: &str = "screenshot_inbox";
pub const VAULT_PATH_ENV: &str = "OBSIDIAN_VAULT_PATH";
pub const SCREENSHOT_INBOX_ENV: &str = "SCREENSHOT_INBOX";

/// Name of this server's entry under `mcpServers` in Claude Desktop's config.
pub const CLAUDE_SERVER_NAME: &str = "blueprince_notes_mcp";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_inbox: Option<String>,
}

/// A config whose vault has been checked. Read-only after construction.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub paths: VaultPaths,
    pub screenshot_inbox: Option<PathBuf>,
}

/// `~/.blueprince_mcp/config.yaml`
pub fn default_config_path() -> VaultResult<PathBuf> {
    Ok(expand_home("~")?.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl Config {
    pub fn from_file(path: &Path) -> VaultResult<Self> {
        let raw = fs::read_to_string(path).with_path(path)?;
        serde_yaml::from_str(&raw).map_err(|e| {
            VaultError::Config(format!("failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Layer CLI/env values over the config file. A missing file is fine when
    /// the vault path is supplied some other way.
    pub fn load(
        config_path: Option<&Path>,
        vault_override: Option<String>,
        inbox_override: Option<String>,
    ) -> VaultResult<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };

        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "loading config file");
            Self::from_file(&path)?
        } else if vault_override.is_some() {
            tracing::info!("no config file, using environment");
            Self::default()
        } else {
            return Err(VaultError::Config(format!(
                "config file {} not found and {} is not set",
                path.display(),
                VAULT_PATH_ENV
            )));
        };

        if let Some(vault) = vault_override.filter(|v| !v.is_empty()) {
            config.vault_path = vault;
        }
        if let Some(inbox) = inbox_override.filter(|v| !v.is_empty()) {
            config.screenshot_inbox = Some(inbox);
        }
        Ok(config)
    }

    /// Check the vault root and its layout.
    pub fn validate(&self) -> VaultResult<VaultConfig> {
        let raw = self.vault_path.trim();
        if raw.is_empty() || raw == PLACEHOLDER_VAULT_PATH {
            return Err(VaultError::Config(format!(
                "{} must be set to a valid path",
                VAULT_PATH_FIELD
            )));
        }
        if raw == "/" {
            return Err(VaultError::Config(format!(
                "{} cannot be the root directory '/'",
                VAULT_PATH_FIELD
            )));
        }

        let root = resolve_and_clean(raw)?;
        if root.parent().is_none() {
            return Err(VaultError::Config(format!(
                "{} cannot be the root directory '{}'",
                VAULT_PATH_FIELD,
                root.display()
            )));
        }
        validate_dir(&root)?;
        validate_base_structure(&root)?;

        let paths = VaultPaths::from_root(root);
        validate_category_structure(&paths.notes)?;

        let screenshot_inbox = match self.screenshot_inbox.as_deref().map(str::trim) {
            Some(inbox) if !inbox.is_empty() => Some(resolve_and_clean(inbox)?),
            _ => None,
        };

        Ok(VaultConfig {
            paths,
            screenshot_inbox,
        })
    }
}

/// Copy the current contents to `<path>.bak`.
fn create_backup(path: &Path, content: &[u8]) -> VaultResult<()> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bak");
    let backup = PathBuf::from(backup);
    fs::write(&backup, content).with_path(&backup)
}

fn write_with_backup(path: &Path, previous: Option<&[u8]>, updated: &[u8]) -> VaultResult<()> {
    if let Some(previous) = previous {
        if let Err(e) = create_backup(path, previous) {
            tracing::warn!(path = %path.display(), error = %e, "failed to back up config file");
        }
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        crate::core::files::ensure_dir_exists(parent)?;
    }
    fs::write(path, updated).with_path(path)
}

/// Set a top-level field in a YAML config file, creating the file if needed.
pub fn update_yaml_field(path: &Path, field: &str, value: &str) -> VaultResult<()> {
    let previous = match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(VaultError::io(path, e)),
    };

    let mut doc: YamlValue = match &previous {
        Some(bytes) if !bytes.is_empty() => serde_yaml::from_slice(bytes).map_err(|e| {
            VaultError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?,
        _ => YamlValue::Mapping(Default::default()),
    };

    let map = doc
        .as_mapping_mut()
        .ok_or_else(|| VaultError::Config(format!("{} is not a YAML mapping", path.display())))?;
    map.insert(YamlValue::from(field), YamlValue::from(value));

    let updated = serde_yaml::to_string(&doc)
        .map_err(|e| VaultError::Serialization(format!("failed to marshal config: {}", e)))?;
    write_with_backup(path, previous.as_deref(), updated.as_bytes())
}

/// Set `mcpServers.<server>.env.<var>` in a Claude Desktop config file.
pub fn update_claude_desktop_env(
    path: &Path,
    server: &str,
    var: &str,
    value: &str,
) -> VaultResult<()> {
    let previous = fs::read(path).with_path(path)?;
    let mut doc: JsonValue = serde_json::from_slice(&previous).map_err(|e| {
        VaultError::Config(format!("failed to parse {}: {}", path.display(), e))
    })?;

    let entry = doc
        .get_mut("mcpServers")
        .and_then(JsonValue::as_object_mut)
        .ok_or_else(|| VaultError::Config("'mcpServers' key not found or not a map".into()))?
        .get_mut(server)
        .and_then(JsonValue::as_object_mut)
        .ok_or_else(|| {
            VaultError::Config(format!("'mcpServers.{}' key not found or not a map", server))
        })?;

    let env = entry
        .entry("env")
        .or_insert_with(|| JsonValue::Object(Default::default()));
    if !env.is_object() {
        *env = JsonValue::Object(Default::default());
        tracing::info!("replaced non-object 'env' block in Claude Desktop config");
    }
    if let Some(env) = env.as_object_mut() {
        env.insert(var.to_string(), JsonValue::String(value.to_string()));
    }

    let updated = serde_json::to_string_pretty(&doc)
        .map_err(|e| VaultError::Serialization(format!("failed to marshal config: {}", e)))?;
    write_with_backup(path, Some(&previous), updated.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::ensure_structure;

    fn vault_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vault");
        ensure_structure(&VaultPaths::from_root(root.clone())).unwrap();
        (dir, root)
    }

    fn config_for(root: &Path) -> Config {
        Config {
            vault_path: root.display().to_string(),
            screenshot_inbox: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_vault() {
        let (_dir, root) = vault_dir();
        let validated = config_for(&root).validate().unwrap();
        assert_eq!(validated.paths.notes, root.join("notes"));
        assert!(validated.screenshot_inbox.is_none());
    }

    #[test]
    fn test_validate_rejects_root_and_empty() {
        for bad in ["", "/", PLACEHOLDER_VAULT_PATH] {
            let config = Config {
                vault_path: bad.to_string(),
                screenshot_inbox: None,
            };
            assert!(matches!(config.validate(), Err(VaultError::Config(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_validate_rejects_missing_vault_and_files() {
        let (dir, root) = vault_dir();
        assert!(config_for(&dir.path().join("nope")).validate().is_err());

        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            config_for(&file).validate(),
            Err(VaultError::NotADirectory(_))
        ));

        fs::remove_dir(root.join("notes/puzzles")).unwrap();
        assert!(matches!(
            config_for(&root).validate(),
            Err(VaultError::MissingSubdir { ref name, .. }) if name == "puzzles"
        ));
    }

    #[test]
    fn test_load_prefers_override() {
        let (dir, root) = vault_dir();
        let file = dir.path().join("config.yaml");
        fs::write(&file, "vault_path: /somewhere/else\nscreenshot_inbox: /inbox\n").unwrap();

        let config = Config::load(Some(&file), Some(root.display().to_string()), None).unwrap();
        assert_eq!(config.vault_path, root.display().to_string());
        assert_eq!(config.screenshot_inbox.as_deref(), Some("/inbox"));
    }

    #[test]
    fn test_load_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            Config::load(Some(&missing), None, None),
            Err(VaultError::Config(_))
        ));
        let config = Config::load(Some(&missing), Some("/v".into()), None).unwrap();
        assert_eq!(config.vault_path, "/v");
    }

    #[test]
    fn test_update_yaml_field_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.yaml");
        fs::write(&file, "vault_path: /old\nserver:\n  port: 8080\n").unwrap();

        update_yaml_field(&file, VAULT_PATH_FIELD, "/new").unwrap();

        let config = Config::from_file(&file).unwrap();
        assert_eq!(config.vault_path, "/new");
        assert!(fs::read_to_string(&file).unwrap().contains("port: 8080"));
        assert_eq!(
            fs::read_to_string(dir.path().join("config.yaml.bak")).unwrap(),
            "vault_path: /old\nserver:\n  port: 8080\n"
        );
    }

    #[test]
    fn test_update_yaml_field_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/config.yaml");
        update_yaml_field(&file, VAULT_PATH_FIELD, "/v").unwrap();
        assert_eq!(Config::from_file(&file).unwrap().vault_path, "/v");
        assert!(!dir.path().join("nested/config.yaml.bak").exists());
    }

    #[test]
    fn test_update_claude_desktop_env() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("claude.json");
        let original = r#"{"mcpServers":{"blueprince_notes_mcp":{"command":"blueprince","args":["mcp"]}}}"#;
        fs::write(&file, original).unwrap();

        update_claude_desktop_env(&file, CLAUDE_SERVER_NAME, VAULT_PATH_ENV, "/vault").unwrap();

        let doc: JsonValue = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(
            doc["mcpServers"][CLAUDE_SERVER_NAME]["env"][VAULT_PATH_ENV],
            "/vault"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("claude.json.bak")).unwrap(),
            original
        );

        assert!(matches!(
            update_claude_desktop_env(&file, "other_server", VAULT_PATH_ENV, "/vault"),
            Err(VaultError::Config(_))
        ));
    }
}

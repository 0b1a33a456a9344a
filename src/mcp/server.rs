//! Blue Prince notes MCP server

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
        PaginatedRequestParam, RawResource, ReadResourceRequestParam, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
    ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::{Component, Path};
use std::sync::Arc;

use super::rules::{RULES_DESCRIPTION, RULES_NAME, RULES_URI, SPOILER_RULES};
use crate::config::VaultConfig;
use crate::core::files::{is_text_mime, list_files, mime_type};
use crate::core::frontmatter::NoteMetadata;
use crate::core::guard::check_content;
use crate::core::image::{compress_image, data_uri};
use crate::core::note;
use crate::core::paths::{secure_join, VaultPaths};
use crate::core::schema::{Category, Choice, Confidence, Status};
use crate::error::{VaultError, VaultResult};
use crate::storage::{FolderStore, Store};

pub const SERVER_NAME: &str = "Blue Prince Architect Notes - SPOILER-FREE Note Taking";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const FILE_URI_PREFIX: &str = "file:///";
const PREVIEW_MAX_WIDTH: u32 = 200;
const PREVIEW_MAX_HEIGHT: u32 = 200;
const PREVIEW_QUALITY: u8 = 70;

/// Parameters for tools addressing a single note
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NotePathParams {
    #[schemars(description = "Note path relative to the notes folder (e.g. 'rooms/nook.md')")]
    pub path: String,
}

/// Note frontmatter as supplied by the client
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MetadataParams {
    #[schemars(description = "Short descriptive title")]
    pub title: String,
    #[schemars(description = "One of: people, puzzles, rooms, items, lore, general")]
    pub category: String,
    #[schemars(description = "Main person, room, item or puzzle the note is about")]
    pub primary_subject: String,
    #[schemars(description = "Lowercase tags taken from the user's own words")]
    pub tags: Vec<String>,
    #[schemars(description = "One of: high, medium, low")]
    pub confidence: String,
    #[schemars(
        description = "One of: complete, needs_investigation, active_investigation, theory, confirmed"
    )]
    pub status: String,
    #[schemars(
        description = "RFC3339 creation time to keep on update_note when the existing file has none"
    )]
    #[serde(default)]
    pub created_at: Option<String>,
}

impl MetadataParams {
    fn into_metadata(self) -> VaultResult<NoteMetadata> {
        Ok(NoteMetadata {
            title: self.title,
            category: Category::parse_choice(&self.category)?,
            primary_subject: self.primary_subject,
            tags: self.tags,
            confidence: Confidence::parse_choice(&self.confidence)?,
            status: Status::parse_choice(&self.status)?,
            created_at: self.created_at.filter(|c| !c.trim().is_empty()),
            updated_at: None,
        })
    }
}

/// Parameters for create_note and update_note
#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoteParams {
    #[schemars(description = "Note path relative to the notes folder (e.g. 'rooms/nook.md')")]
    pub path: String,
    pub metadata: MetadataParams,
    #[schemars(description = "Markdown body containing only what the user observed")]
    pub content: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotSource {
    /// Screenshots already in the vault
    #[default]
    Local,
    /// Screenshots waiting in the inbox
    #[serde(alias = "google drive", alias = "drive", alias = "inbox")]
    Store,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListScreenshotsParams {
    #[schemars(description = "'local' for the vault's screenshots folder, 'store' for the inbox")]
    #[serde(default)]
    pub source: ScreenshotSource,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadScreenshotsParams {
    #[schemars(description = "File to download from the inbox; omit to download all")]
    #[serde(default)]
    pub file_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScreenshotParams {
    #[schemars(description = "Screenshot file name relative to the screenshots folder")]
    pub file_name: String,
}

/// Turn a vault result into a tool result. Failures are reported to the
/// client as tool errors, never as protocol errors.
fn tool_result(tool: &str, result: VaultResult<String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            tracing::warn!(tool, error = %e, "tool call failed");
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> VaultResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| VaultError::Serialization(format!("JSON serialization failed: {}", e)))
}

fn is_hidden_path(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Blue Prince notes MCP service
#[derive(Clone)]
pub struct VaultService {
    paths: VaultPaths,
    store: Option<Arc<dyn Store>>,
    tool_router: ToolRouter<Self>,
}

impl VaultService {
    pub fn new(paths: VaultPaths, store: Option<Arc<dyn Store>>) -> Self {
        Self {
            paths,
            store,
            tool_router: Self::tool_router(),
        }
    }

    /// Build the service from a validated config. A broken inbox only
    /// disables the store-backed screenshot tools.
    pub fn from_config(config: VaultConfig) -> Self {
        let store = config.screenshot_inbox.and_then(|inbox| {
            match FolderStore::new(inbox, config.paths.clone()) {
                Ok(store) => Some(Arc::new(store) as Arc<dyn Store>),
                Err(e) => {
                    tracing::warn!(error = %e, "screenshot store disabled");
                    None
                }
            }
        });
        Self::new(config.paths, store)
    }

    fn store(&self) -> VaultResult<&Arc<dyn Store>> {
        self.store.as_ref().ok_or_else(|| {
            VaultError::Store("no screenshot inbox configured (set SCREENSHOT_INBOX)".into())
        })
    }

    fn existing_screenshot(&self, file_name: &str) -> VaultResult<std::path::PathBuf> {
        let path = self.paths.screenshot(file_name)?;
        if !path.is_file() {
            return Err(VaultError::NotFound(format!("screenshot '{}'", file_name)));
        }
        Ok(path)
    }

    fn write_note(&self, params: NoteParams, create: bool) -> VaultResult<String> {
        check_content(&params.content)?;
        let metadata = params.metadata.into_metadata()?;

        if create {
            note::create(&self.paths, &params.path, metadata, &params.content)?;
            Ok(format!("Successfully created note: {}", params.path))
        } else {
            note::update(&self.paths, &params.path, metadata, &params.content)?;
            Ok(format!("Successfully updated note: {}", params.path))
        }
    }

    fn vault_resources(&self) -> VaultResult<Vec<rmcp::model::Resource>> {
        let mut resources = Vec::new();
        for relative in list_files(&self.paths.root)? {
            let mime = mime_type(&relative);
            if !is_text_mime(mime) {
                continue;
            }
            let name = relative.to_string_lossy().replace('\\', "/");
            let mut raw = RawResource::new(format!("{}{}", FILE_URI_PREFIX, name), name.clone());
            raw.description = Some(format!("Vault file: {}", name));
            raw.mime_type = Some(mime.to_string());
            resources.push(raw.no_annotation());
        }
        Ok(resources)
    }

    fn read_vault_file(&self, uri: &str) -> VaultResult<(String, &'static str)> {
        let relative = uri.strip_prefix(FILE_URI_PREFIX).ok_or_else(|| {
            VaultError::invalid_path(uri, "unsupported resource URI scheme")
        })?;
        let path = secure_join(&self.paths.root, "", relative)?;
        if is_hidden_path(Path::new(relative)) {
            return Err(VaultError::AccessDenied(relative.to_string()));
        }

        let mime = mime_type(&path);
        if !is_text_mime(mime) {
            return Err(VaultError::invalid_path(relative, "not a text file"));
        }
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VaultError::NotFound(relative.to_string()),
            _ => VaultError::io(&path, e),
        })?;
        Ok((text, mime))
    }
}

#[tool_router]
impl VaultService {
    #[tool(description = "Lists all notes in the vault as paths relative to the notes folder.")]
    async fn list_notes(&self) -> Result<CallToolResult, McpError> {
        Ok(tool_result(
            "list_notes",
            note::list(&self.paths).and_then(|notes| to_json(&notes)),
        ))
    }

    #[tool(description = "Creates a structured Blue Prince note from the user's input. \
SPOILER PREVENTION: this is a spoiler-free note system, so never use outside Blue Prince knowledge. \
(1) Never add investigation questions, analysis prompts or checklists. \
(2) Never add speculation beyond what the user observed. \
(3) The content field holds only what the user provided, reformatted as basic markdown. \
(4) Do not add sections like 'Questions to Investigate', 'Analysis' or 'Next Steps'; such content is rejected. \
(5) Fails if the note already exists; use update_note instead.

EXAMPLE
User input: \"room: nook, paintings of tiger and a cupcake stand? Weird\"
Call: {\"path\": \"rooms/nook_tiger_paintings.md\", \"metadata\": {\"title\": \"Nook - Tiger Paintings and Cupcake Stand\", \"category\": \"rooms\", \"primary_subject\": \"nook\", \"tags\": [\"rooms\", \"nook\", \"paintings\", \"tiger\", \"cupcake_stand\"], \"confidence\": \"medium\", \"status\": \"needs_investigation\"}, \"content\": \"# Nook - Tiger Paintings and Cupcake Stand\\n\\nPaintings of tiger and a cupcake stand? Weird\"}")]
    async fn create_note(
        &self,
        Parameters(params): Parameters<NoteParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tool_result("create_note", self.write_note(params, true)))
    }

    #[tool(description = "Reads the full content of a note, frontmatter included.")]
    async fn read_note(
        &self,
        Parameters(params): Parameters<NotePathParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tool_result("read_note", note::read(&self.paths, &params.path)))
    }

    #[tool(description = "Replaces an existing note with new metadata and content. \
Read the note first and merge the user's new observations into the existing content. \
created_at is kept from the existing file; metadata.created_at is used only when the file has none. \
Never add investigation questions, analysis or speculation unless the user asked for it.")]
    async fn update_note(
        &self,
        Parameters(params): Parameters<NoteParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(tool_result("update_note", self.write_note(params, false)))
    }

    #[tool(description = "Deletes a note. Only use when the user explicitly asks for it.")]
    async fn delete_note(
        &self,
        Parameters(params): Parameters<NotePathParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = note::delete(&self.paths, &params.path)
            .map(|()| format!("Successfully deleted note: {}", params.path));
        Ok(tool_result("delete_note", result))
    }

    #[tool(description = "Lists screenshots, either already in the vault ('local') or waiting in the screenshot inbox ('store').")]
    async fn list_screenshots(
        &self,
        Parameters(params): Parameters<ListScreenshotsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = match params.source {
            ScreenshotSource::Local => list_files(&self.paths.screenshots).map(|files| {
                files
                    .iter()
                    .map(|f| f.to_string_lossy().replace('\\', "/"))
                    .collect::<Vec<_>>()
            }),
            ScreenshotSource::Store => self.store().and_then(|store| store.list_files()),
        };
        Ok(tool_result(
            "list_screenshots",
            result.and_then(|files| to_json(&files)),
        ))
    }

    #[tool(description = "Downloads screenshots from the inbox into the vault's screenshots folder and archives the originals. Omit file_name to download everything.")]
    async fn download_screenshots(
        &self,
        Parameters(params): Parameters<DownloadScreenshotsParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .store()
            .and_then(|store| store.get_files(&params.file_name))
            .map(|files| {
                format!(
                    "Downloaded {} screenshot(s): {}",
                    files.len(),
                    files.join(", ")
                )
            });
        Ok(tool_result("download_screenshots", result))
    }

    #[tool(description = "Shows a small preview of a screenshot from the vault.")]
    async fn view_screenshot(
        &self,
        Parameters(params): Parameters<ScreenshotParams>,
    ) -> Result<CallToolResult, McpError> {
        let compressed = self.existing_screenshot(&params.file_name).and_then(|path| {
            compress_image(&path, PREVIEW_MAX_WIDTH, PREVIEW_MAX_HEIGHT, PREVIEW_QUALITY)
        });

        match compressed {
            Ok(img) => {
                tracing::info!(
                    file = %params.file_name,
                    width = img.width,
                    height = img.height,
                    ratio = img.compression_ratio(),
                    "compressed screenshot"
                );
                Ok(CallToolResult::success(vec![
                    Content::text(format!(
                        "{} ({}x{}, {} bytes)",
                        params.file_name, img.width, img.height, img.compressed_size
                    )),
                    Content::image(img.data, img.mime_type),
                ]))
            }
            Err(e) => Ok(tool_result("view_screenshot", Err(e))),
        }
    }

    #[tool(description = "Returns a screenshot from the vault as a base64 data URI so its contents can be analyzed. Describe only what is visible; do not add game knowledge.")]
    async fn analyze_screenshot(
        &self,
        Parameters(params): Parameters<ScreenshotParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.existing_screenshot(&params.file_name).and_then(|path| {
            let mime = mime_type(&path);
            if !mime.starts_with("image/") {
                return Err(VaultError::invalid_path(&params.file_name, "not an image file"));
            }
            data_uri(&path, mime)
        });
        Ok(tool_result("analyze_screenshot", result))
    }
}

#[tool_handler]
impl ServerHandler for VaultService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(format!(
                "Spoiler-free Blue Prince note taking over an Obsidian vault. \
                 Read the {} resource before helping the user.",
                RULES_URI
            )),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let mut resources = self
            .vault_resources()
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let mut rules = RawResource::new(RULES_URI, RULES_NAME);
        rules.description = Some(RULES_DESCRIPTION.to_string());
        rules.mime_type = Some(mime_type(Path::new("rules.md")).to_string());
        resources.push(rules.no_annotation());

        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        if uri == RULES_URI {
            tracing::info!(uri = %uri, "loading spoiler protection rules");
            return Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(SPOILER_RULES, uri)],
            });
        }

        match self.read_vault_file(&uri) {
            Ok((text, _mime)) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(text, uri)],
            }),
            Err(VaultError::NotFound(_)) => Err(McpError::resource_not_found(
                format!("resource not found: {}", uri),
                None,
            )),
            Err(e) => {
                tracing::warn!(uri = %uri, error = %e, "resource read rejected");
                Err(McpError::invalid_params(e.to_string(), None))
            }
        }
    }
}

/// Run the MCP server over stdio
pub async fn run_mcp_server(config: VaultConfig) -> Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!(vault = %config.paths.root.display(), "starting {}", SERVER_NAME);

    let service = VaultService::from_config(config);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;

    tracing::info!("server running, waiting for requests");
    server.waiting().await?;
    tracing::info!("server shutting down");

    Ok(())
}

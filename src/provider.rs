//! Collaborators that supply, convert, persist and render page content.
//!
//! The editor core only talks to these traits. [`FsContentProvider`] and
//! [`PlainRenderer`] are local implementations backed by a directory of JSON
//! files, used by the `cte` binary and the tests.

use crate::error::{EditorError, EditorResult};
use crate::page::{PageNode, markup};
use crate::title::encode_api_component;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Result of fetching a page's structured content.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    /// Structured content, `None` when the page does not exist.
    pub content: Option<PageNode>,
    /// Optimistic concurrency token for the fetched revision.
    pub version_token: Option<String>,
    pub exists: bool,
}

impl FetchedContent {
    pub fn missing() -> Self {
        Self {
            content: None,
            version_token: None,
            exists: false,
        }
    }
}

/// Input to [`ContentProvider::convert_to_native_markup`].
#[derive(Debug, Clone, Copy)]
pub struct ConvertRequest<'a> {
    pub page: &'a str,
    pub content: &'a PageNode,
    /// Absent for pages that did not exist at load.
    pub version_token: Option<&'a str>,
    pub revision: Option<&'a str>,
}

/// Input to [`ContentProvider::persist`].
#[derive(Debug, Clone, Copy)]
pub struct PersistRequest<'a> {
    pub page: &'a str,
    pub text: &'a str,
    pub content: &'a PageNode,
    pub summary: &'a str,
    /// Token captured at load. `None` asserts the page does not exist yet.
    pub version_token: Option<&'a str>,
}

/// Outcome of a successful persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistOutcome {
    /// Token of the newly stored revision.
    pub version_token: String,
    /// Id of the newly stored revision, if the store reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Source and sink of page content.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_structured_content(&self, page: &str) -> EditorResult<FetchedContent>;

    async fn convert_to_native_markup(&self, request: ConvertRequest<'_>) -> EditorResult<String>;

    /// Store a new revision. Fails with `VersionMismatch` if the page changed
    /// since `version_token` was issued.
    async fn persist(&self, request: PersistRequest<'_>) -> EditorResult<PersistOutcome>;
}

/// Converts a notice's call syntax into previewable markup.
#[async_trait]
pub trait RenderService: Send + Sync {
    async fn render_to_preview_markup(&self, page: &str, text: &str) -> EditorResult<String>;
}

/// Page revision as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPage {
    revision: u64,
    content: PageNode,
    #[serde(default)]
    wikitext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    saved_at: DateTime<Utc>,
}

/// Directory-backed page store. One `<encoded title>.json` file per page;
/// the revision counter doubles as the version token.
#[derive(Debug)]
pub struct FsContentProvider {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `page`.
    pub fn path_for(&self, page: &str) -> PathBuf {
        self.root
            .join(format!("{}.json", encode_api_component(page.trim())))
    }

    async fn read_stored(&self, page: &str) -> EditorResult<Option<StoredPage>> {
        let path = self.path_for(page);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EditorError::fetch_failed(page, e)),
        };
        let stored = serde_json::from_str(&raw)
            .map_err(|e| EditorError::fetch_failed(page, e).with_details(path.display().to_string()))?;
        Ok(Some(stored))
    }
}

#[async_trait]
impl ContentProvider for FsContentProvider {
    async fn fetch_structured_content(&self, page: &str) -> EditorResult<FetchedContent> {
        let Some(stored) = self.read_stored(page).await? else {
            debug!(page, "Page not in store");
            return Ok(FetchedContent::missing());
        };
        let mut content = stored.content;
        content
            .attrs
            .insert("about".to_string(), format!("revision/{}", stored.revision));
        Ok(FetchedContent {
            content: Some(content),
            version_token: Some(stored.revision.to_string()),
            exists: true,
        })
    }

    async fn convert_to_native_markup(&self, request: ConvertRequest<'_>) -> EditorResult<String> {
        debug!(
            page = request.page,
            revision = request.revision.unwrap_or("new"),
            "Converting page to markup"
        );
        Ok(markup::to_wikitext(request.content))
    }

    async fn persist(&self, request: PersistRequest<'_>) -> EditorResult<PersistOutcome> {
        let _guard = self.write_lock.lock().await;
        let page = request.page;

        let current = self.read_stored(page).await?.map(|stored| stored.revision);
        let current_token = current.map(|rev| rev.to_string());
        if current_token.as_deref() != request.version_token {
            return Err(EditorError::version_mismatch(
                page,
                request.version_token.unwrap_or("none"),
                current_token.as_deref().unwrap_or("none"),
            ));
        }

        let mut content = request.content.clone();
        content.attrs.shift_remove("about");
        let stored = StoredPage {
            revision: current.unwrap_or(0) + 1,
            content,
            wikitext: request.text.to_string(),
            summary: Some(request.summary.to_string()),
            saved_at: Utc::now(),
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EditorError::persist_failed(page, e))?;
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| EditorError::persist_failed(page, e))?;
        tokio::fs::write(self.path_for(page), json)
            .await
            .map_err(|e| EditorError::persist_failed(page, e))?;

        info!(page, revision = stored.revision, "Saved page");
        Ok(PersistOutcome {
            version_token: stored.revision.to_string(),
            revision: Some(stored.revision.to_string()),
        })
    }
}

/// Renders call syntax as escaped preformatted text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

#[async_trait]
impl RenderService for PlainRenderer {
    async fn render_to_preview_markup(&self, page: &str, text: &str) -> EditorResult<String> {
        Ok(format!(
            "<div class=\"cte-preview\" data-page=\"{}\"><pre>{}</pre></div>",
            escape_html(page),
            escape_html(text)
        ))
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

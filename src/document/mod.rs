//! A talk page being edited and the `{{copied}}` notices found in it.
//!
//! [`Document`] owns the page tree and every [`CopiedTemplate`] bound to it.
//! Structural changes (inserting, merging and destroying notices, moving rows
//! between notices) go through the document so that the notice list always
//! matches what a fresh scan of the tree would find.

mod edit;
mod spot;

pub use edit::MergeOptions;
pub use spot::{InsertionSpot, find_insertion_spot};

use crate::config::NoticeConfig;
use crate::error::{EditorError, EditorResult};
use crate::notice::{
    CopiedTemplate, DocumentEvent, ListenerId, NoticeEvent, Notifier, Row, RowId, RowIdSequence,
};
use crate::page::transclusion::is_transclusion;
use crate::page::{PageNode, PageTree, TransclusionData};
use crate::provider::{ContentProvider, ConvertRequest, PersistOutcome, PersistRequest};
use tracing::{debug, error, info, warn};

/// Verb used in edit summaries.
fn summary_action(original_notice_count: usize) -> &'static str {
    if original_notice_count > 0 {
        "Modifying"
    } else {
        "Adding"
    }
}

/// Revision number from the trailing digits of the root `about` attribute.
fn revision_of(tree: &PageTree) -> Option<String> {
    let about = tree.attr(tree.root(), "about")?;
    let digits_start = about.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    about[digits_start..]
        .parse::<u64>()
        .ok()
        .map(|rev| rev.to_string())
}

#[derive(Debug)]
pub struct Document {
    config: NoticeConfig,
    page: Option<String>,
    etag: Option<String>,
    not_found: bool,
    revision: Option<String>,
    tree: Option<PageTree>,
    notices: Vec<CopiedTemplate>,
    original_notice_count: usize,
    /// Counter for synthetic `N<k>` group identifiers.
    next_group: u64,
    row_ids: RowIdSequence,
    events: Notifier<DocumentEvent>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(NoticeConfig::default())
    }
}

impl Document {
    /// Empty document recognizing notices per `config`.
    pub fn new(config: NoticeConfig) -> Self {
        Self {
            config,
            page: None,
            etag: None,
            not_found: false,
            revision: None,
            tree: None,
            notices: Vec::new(),
            original_notice_count: 0,
            next_group: 1,
            row_ids: RowIdSequence::new(),
            events: Notifier::new(),
        }
    }

    /// Fetch `page` and scan it for notices. A page that does not exist is
    /// replaced by an empty document and flagged as not found.
    ///
    /// On failure the document stays unloaded.
    pub async fn load<P>(&mut self, provider: &P, page: &str) -> EditorResult<()>
    where
        P: ContentProvider + ?Sized,
    {
        if let Some(loaded) = &self.page {
            return Err(EditorError::page_already_loaded(loaded));
        }

        let fetched = provider
            .fetch_structured_content(page)
            .await
            .inspect_err(|e| error!(page, "Failed to fetch page: {}", e))?;

        let (content, not_found) = match fetched.content {
            Some(content) if fetched.exists => (content, false),
            _ => (PageNode::empty_document(), true),
        };
        let tree = PageTree::from_node(&content);

        self.revision = revision_of(&tree);
        self.etag = fetched.version_token;
        self.not_found = not_found;
        self.tree = Some(tree);
        self.page = Some(page.to_string());
        self.scan()?;
        self.original_notice_count = self.notices.len();

        info!(
            page,
            notices = self.original_notice_count,
            not_found,
            "Loaded page"
        );
        self.events.emit(&DocumentEvent::Loaded {
            notices: self.original_notice_count,
        });
        Ok(())
    }

    /// Discard all edits and load the same page again.
    pub async fn reload<P>(&mut self, provider: &P) -> EditorResult<()>
    where
        P: ContentProvider + ?Sized,
    {
        let page = self.page.clone().ok_or_else(EditorError::page_not_loaded)?;
        self.reset();
        self.load(provider, &page).await
    }

    /// Drop the loaded page and its notices. Listeners on the document
    /// remain registered.
    pub fn reset(&mut self) {
        self.page = None;
        self.etag = None;
        self.not_found = false;
        self.revision = None;
        self.tree = None;
        self.notices.clear();
        self.original_notice_count = 0;
    }

    /// Rebuild the notice list from the page tree.
    ///
    /// Every template part whose target matches a configured alias becomes a
    /// notice; one node can yield several. Nodes whose `data-mw` cannot be
    /// read are skipped.
    pub fn scan(&mut self) -> EditorResult<()> {
        let tree = self.tree.as_ref().ok_or_else(EditorError::page_not_loaded)?;
        let mut notices = Vec::new();

        for node in tree.select(is_transclusion) {
            let data = match TransclusionData::read(tree, node) {
                Ok(data) => data,
                Err(e) => {
                    warn!(?node, "Skipping unreadable transclusion: {}", e);
                    continue;
                }
            };
            for call in data.templates() {
                // Parser functions have no href.
                let Some(href) = call.target.href.as_deref() else {
                    continue;
                };
                if !self.config.matches(href) {
                    continue;
                }
                match CopiedTemplate::bind(tree, node, call.i, &mut self.row_ids) {
                    Ok(notice) => notices.push(notice),
                    Err(e) => warn!(?node, index = call.i, "Skipping notice: {}", e),
                }
            }
        }

        debug!(notices = notices.len(), "Scanned page");
        self.notices = notices;
        Ok(())
    }

    /// Native markup of the current page state.
    pub async fn serialize<P>(&self, provider: &P) -> EditorResult<String>
    where
        P: ContentProvider + ?Sized,
    {
        let page = self.page()?;
        let content = self.tree()?.to_node();
        let (version_token, revision) = if self.not_found {
            (None, None)
        } else {
            (self.etag.as_deref(), self.revision.as_deref())
        };
        provider
            .convert_to_native_markup(ConvertRequest {
                page,
                content: &content,
                version_token,
                revision,
            })
            .await
    }

    /// Serialize and persist the page, guarded by the version token captured
    /// at load.
    pub async fn save<P>(&mut self, provider: &P, advert: &str) -> EditorResult<PersistOutcome>
    where
        P: ContentProvider + ?Sized,
    {
        let text = self.serialize(provider).await?;
        let summary = self.edit_summary(advert);
        let page = self.page()?;
        let content = self.tree()?.to_node();
        let version_token = if self.not_found {
            None
        } else {
            self.etag.as_deref()
        };

        let outcome = provider
            .persist(PersistRequest {
                page,
                text: &text,
                content: &content,
                summary: &summary,
                version_token,
            })
            .await?;

        self.etag = Some(outcome.version_token.clone());
        self.revision = outcome.revision.clone();
        self.not_found = false;
        Ok(outcome)
    }

    /// Edit summary for saving this page.
    pub fn edit_summary(&self, advert: &str) -> String {
        format!(
            "{} {{{{[[Template:Copied|copied]]}}}} templates {}",
            summary_action(self.original_notice_count),
            advert
        )
        .trim_end()
        .to_string()
    }

    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    /// Title of the loaded page.
    pub fn page(&self) -> EditorResult<&str> {
        self.page.as_deref().ok_or_else(EditorError::page_not_loaded)
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn not_found(&self) -> bool {
        self.not_found
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Number of notices found when the page was loaded.
    pub fn original_notice_count(&self) -> usize {
        self.original_notice_count
    }

    pub fn config(&self) -> &NoticeConfig {
        &self.config
    }

    pub fn tree(&self) -> EditorResult<&PageTree> {
        self.tree.as_ref().ok_or_else(EditorError::page_not_loaded)
    }

    pub(crate) fn tree_mut(&mut self) -> EditorResult<&mut PageTree> {
        self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)
    }

    /// Notices in document order.
    pub fn notices(&self) -> &[CopiedTemplate] {
        &self.notices
    }

    pub fn notice(&self, id: &str) -> Option<&CopiedTemplate> {
        self.notices.iter().find(|notice| notice.id() == id)
    }

    fn notice_index(&self, id: &str) -> Option<usize> {
        self.notices.iter().position(|notice| notice.id() == id)
    }

    /// Locate a row in any notice.
    pub fn find_row(&self, id: &RowId) -> Option<(&CopiedTemplate, &Row)> {
        self.notices
            .iter()
            .find_map(|notice| notice.row(id).map(|row| (notice, row)))
    }

    /// Inline call syntax of a notice.
    pub fn to_text(&self, notice: &str) -> EditorResult<String> {
        let tree = self.tree()?;
        self.notice(notice)
            .ok_or_else(|| EditorError::notice_not_found(notice))?
            .to_text(tree)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&DocumentEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Register a listener on one notice. It is dropped with the notice,
    /// including when a rescan replaces the notice list.
    pub fn subscribe_notice<F>(&mut self, notice: &str, listener: F) -> EditorResult<ListenerId>
    where
        F: FnMut(&NoticeEvent) + Send + 'static,
    {
        let notice = self
            .notices
            .iter_mut()
            .find(|n| n.id() == notice)
            .ok_or_else(|| EditorError::notice_not_found(notice))?;
        Ok(notice.subscribe(listener))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::page::{ParamValue, TemplateCall};
    use crate::page::transclusion::DATA_MW;
    use crate::provider::FetchedContent;
    use async_trait::async_trait;

    struct StaticProvider(Option<PageNode>);

    #[async_trait]
    impl ContentProvider for StaticProvider {
        async fn fetch_structured_content(&self, page: &str) -> EditorResult<FetchedContent> {
            match &self.0 {
                Some(content) => Ok(FetchedContent {
                    content: Some(content.clone()),
                    version_token: Some("etag-1".to_string()),
                    exists: true,
                }),
                None => Err(EditorError::fetch_failed(page, "connection refused")),
            }
        }

        async fn convert_to_native_markup(&self, request: ConvertRequest<'_>) -> EditorResult<String> {
            Ok(format!(
                "{}|{}",
                request.version_token.unwrap_or("-"),
                request.revision.unwrap_or("-")
            ))
        }

        async fn persist(&self, _request: PersistRequest<'_>) -> EditorResult<PersistOutcome> {
            Err(EditorError::persist_failed("x", "read-only"))
        }
    }

    fn transclusion(about: &str, calls: Vec<TemplateCall>) -> PageNode {
        let mut data = TransclusionData::single(calls[0].clone());
        for call in calls.into_iter().skip(1) {
            data.parts.push(crate::page::Part::Template { template: call });
        }
        PageNode::element("span")
            .with_attr("about", about)
            .with_attr("typeof", "mw:Transclusion")
            .with_attr(DATA_MW, data.to_json().unwrap())
    }

    fn call(href: &str, i: u32, from: &str) -> TemplateCall {
        let mut call = TemplateCall::new("x", href, i);
        call.params.insert("from".to_string(), ParamValue::new(from));
        call
    }

    #[test]
    fn test_revision_of() {
        let tree = PageTree::from_node(
            &PageNode::element("html").with_attr("about", "https://w.example/revision/01234"),
        );
        assert_eq!(revision_of(&tree).as_deref(), Some("1234"));
        let tree = PageTree::from_node(&PageNode::element("html"));
        assert!(revision_of(&tree).is_none());
    }

    #[tokio::test]
    async fn test_scan_multi_part_and_aliases() {
        let content = PageNode::element("html")
            .with_attr("about", "revision/77")
            .with_child(PageNode::element("body").with_child(
                PageNode::element("section")
                    .with_attr("data-mw-section-id", "0")
                    .with_child(transclusion(
                        "#mwt2",
                        vec![
                            call("./Template:Copied", 0, "A"),
                            call("./Template:Talk_header", 1, "B"),
                            call("./Template:Copied_from", 2, "C"),
                        ],
                    )),
            ));
        let mut doc = Document::default();
        doc.load(&StaticProvider(Some(content)), "Talk:Foo").await.unwrap();

        let ids: Vec<&str> = doc.notices().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["2-0", "2-2"]);
        assert_eq!(doc.original_notice_count(), 2);
        assert_eq!(doc.revision(), Some("77"));
        assert_eq!(doc.serialize(&StaticProvider(None)).await.unwrap(), "etag-1|77");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_document_unloaded() {
        let mut doc = Document::default();
        let err = doc.load(&StaticProvider(None), "Talk:Foo").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FetchFailed);
        assert!(!doc.is_loaded());
        assert_eq!(doc.page().unwrap_err().code, ErrorCode::PageNotLoaded);
    }

    #[tokio::test]
    async fn test_second_load_rejected() {
        let mut doc = Document::default();
        let provider = StaticProvider(Some(PageNode::empty_document()));
        doc.load(&provider, "Talk:Foo").await.unwrap();
        let err = doc.load(&provider, "Talk:Bar").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PageAlreadyLoaded);
    }

    #[test]
    fn test_edit_summary() {
        let mut doc = Document::default();
        assert_eq!(
            doc.edit_summary("(CTE)"),
            "Adding {{[[Template:Copied|copied]]}} templates (CTE)"
        );
        doc.original_notice_count = 2;
        assert_eq!(
            doc.edit_summary(""),
            "Modifying {{[[Template:Copied|copied]]}} templates"
        );
    }
}

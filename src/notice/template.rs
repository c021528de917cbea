//! A single `{{copied}}` notice bound to its page node.

use super::codec;
use super::events::{ListenerId, NoticeEvent, Notifier};
use super::row::{Row, RowField, RowId, RowIdSequence};
use crate::error::{EditorError, EditorResult};
use crate::page::{NodeId, PageTree, Part, TemplateCall, TransclusionData};
use tracing::debug;

/// Prefix of group identifiers assigned by the page service.
const SERVICE_GROUP_PREFIX: &str = "#mwt";

/// Identifier for the template at index `i` in transclusion group `about`.
pub fn notice_identifier(about: &str, i: u32) -> String {
    format!(
        "{}-{}",
        about.strip_prefix(SERVICE_GROUP_PREFIX).unwrap_or(about),
        i
    )
}

/// One attribution notice.
///
/// The notice reads from and writes to a single template part inside the
/// `data-mw` of its node. Rows are parsed out of the part's parameters and
/// written back wholesale on every change.
#[derive(Debug)]
pub struct CopiedTemplate {
    identifier: String,
    node: NodeId,
    index: u32,
    collapsed: bool,
    small: bool,
    rows: Vec<Row>,
    events: Notifier<NoticeEvent>,
}

impl CopiedTemplate {
    /// Bind a notice to template part `index` of `node` and parse it.
    pub fn bind(
        tree: &PageTree,
        node: NodeId,
        index: u32,
        ids: &mut RowIdSequence,
    ) -> EditorResult<Self> {
        let about = tree.attr(node, "about").ok_or_else(|| {
            EditorError::invalid_content("transclusion node has no about attribute")
        })?;
        let mut notice = Self {
            identifier: notice_identifier(about, index),
            node,
            index,
            collapsed: false,
            small: false,
            rows: Vec::new(),
            events: Notifier::new(),
        };
        notice.parse(tree, ids)?;
        Ok(notice)
    }

    /// Stable key: group identifier plus template index.
    pub fn id(&self) -> &str {
        &self.identifier
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Index of the template part within its transclusion group.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn small(&self) -> bool {
        self.small
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn contains_row(&self, id: &RowId) -> bool {
        self.row(id).is_some()
    }

    /// Register a listener for changes to this notice.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&NoticeEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Current template call from the node.
    pub fn read_call(&self, tree: &PageTree) -> EditorResult<TemplateCall> {
        let data = TransclusionData::read(tree, self.node)?;
        data.templates()
            .find(|call| call.i == self.index)
            .cloned()
            .ok_or_else(|| EditorError::malformed_node(&self.identifier, self.index))
    }

    /// Read-modify-write of this notice's template part.
    ///
    /// Returning `None` from `modify` removes the part. When the last part of
    /// a transclusion goes, every node of its group goes with it.
    fn access_template_data<F>(&self, tree: &mut PageTree, modify: F) -> EditorResult<()>
    where
        F: FnOnce(TemplateCall) -> Option<TemplateCall>,
    {
        let mut data = TransclusionData::read(tree, self.node)?;
        let position = data
            .position_of(self.index)
            .ok_or_else(|| EditorError::malformed_node(&self.identifier, self.index))?;

        let call = match data.parts.remove(position) {
            Part::Template { template } => template,
            Part::Other(_) => {
                return Err(EditorError::malformed_node(&self.identifier, self.index));
            }
        };
        if let Some(call) = modify(call) {
            data.parts
                .insert(position, Part::Template { template: call });
        }
        data.write(tree, self.node)?;

        if data.parts.is_empty() {
            let group = match tree.attr(self.node, "about") {
                Some(about) => tree.about_group(about),
                None => vec![self.node],
            };
            for node in group {
                tree.remove(node);
            }
        }
        Ok(())
    }

    /// Re-derive flags and rows from the node's parameters. Unknown
    /// parameters are dropped. The node is not modified.
    pub fn parse(&mut self, tree: &PageTree, ids: &mut RowIdSequence) -> EditorResult<()> {
        let call = self.read_call(tree)?;
        let decoded = codec::decode(&call.params);
        self.collapsed = decoded.collapsed;
        self.small = decoded.small;
        self.rows = decoded
            .rows
            .into_iter()
            .map(|fields| Row::new(fields, &self.identifier, ids))
            .collect();
        debug!(notice = %self.identifier, rows = self.rows.len(), "Parsed notice");
        Ok(())
    }

    /// Write flags and rows back to the node, replacing all parameters.
    pub fn save(&mut self, tree: &mut PageTree) -> EditorResult<()> {
        let params = codec::encode(
            self.collapsed,
            self.small,
            self.rows.iter().map(Row::fields),
        );
        self.access_template_data(tree, |mut call| {
            call.params = params;
            Some(call)
        })?;
        self.events.emit(&NoticeEvent::Saved);
        Ok(())
    }

    pub fn set_flags(
        &mut self,
        tree: &mut PageTree,
        collapsed: bool,
        small: bool,
    ) -> EditorResult<()> {
        self.collapsed = collapsed;
        self.small = small;
        self.save(tree)
    }

    /// Append a row, taking ownership of it.
    pub fn add_row(&mut self, tree: &mut PageTree, mut row: Row) -> EditorResult<()> {
        row.set_owner(&self.identifier);
        let id = row.id().clone();
        self.rows.push(row);
        self.save(tree)?;
        self.events.emit(&NoticeEvent::RowAdded(id));
        Ok(())
    }

    /// Remove a row. Returns `None`, without saving or notifying, if the row
    /// is not in this notice.
    pub fn delete_row(&mut self, tree: &mut PageTree, id: &RowId) -> EditorResult<Option<Row>> {
        let Some(position) = self.rows.iter().position(|row| row.id() == id) else {
            return Ok(None);
        };
        let row = self.rows.remove(position);
        self.save(tree)?;
        self.events.emit(&NoticeEvent::RowDeleted(id.clone()));
        Ok(Some(row))
    }

    /// Set or clear one field of a row, then save.
    pub fn set_row_field(
        &mut self,
        tree: &mut PageTree,
        id: &RowId,
        field: RowField,
        value: Option<String>,
    ) -> EditorResult<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| EditorError::row_not_found(id.as_str()))?;
        row.set(field, value);
        self.save(tree)
    }

    /// Notify listeners, then remove the template part from the page.
    /// Consumes the notice.
    pub fn destroy(mut self, tree: &mut PageTree) -> EditorResult<()> {
        self.events.emit(&NoticeEvent::Destroyed);
        self.access_template_data(tree, |_| None)?;
        debug!(notice = %self.identifier, "Destroyed notice");
        Ok(())
    }

    /// Inline call syntax of the current parameters.
    pub fn to_text(&self, tree: &PageTree) -> EditorResult<String> {
        Ok(self.read_call(tree)?.to_text())
    }
}

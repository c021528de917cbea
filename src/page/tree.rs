//! Arena-backed page tree.
//!
//! The structured content of a page arrives as a nested [`PageNode`] value.
//! It is flattened into a [`PageTree`] so that notices can hold stable
//! [`NodeId`] handles while nodes are inserted and removed around them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag used for text nodes.
pub const TEXT_TAG: &str = "#text";

/// Nested wire form of a page node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attrs: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PageNode>,
}

impl PageNode {
    /// Create an element node with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            attrs: IndexMap::new(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Set an attribute (builder pattern).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a child (builder pattern).
    pub fn with_child(mut self, child: PageNode) -> Self {
        self.children.push(child);
        self
    }

    /// Minimal valid document, used when a page does not exist yet.
    /// Carries a section 0 so a notice can always be placed.
    pub fn empty_document() -> Self {
        PageNode::element("html").with_child(
            PageNode::element("body")
                .with_child(PageNode::element("section").with_attr("data-mw-section-id", "0")),
        )
    }
}

/// Handle to a node inside a [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Where to attach a node relative to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    /// Immediately after the anchor, as its next sibling.
    AfterEnd,
    /// As the first child of the anchor.
    AfterBegin,
}

#[derive(Debug, Clone)]
struct Slot {
    tag: String,
    attrs: IndexMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Page body as an arena of nodes.
///
/// Removed nodes leave an empty slot behind; their ids are never reused, so a
/// stale `NodeId` simply stops resolving.
#[derive(Debug, Clone)]
pub struct PageTree {
    slots: Vec<Option<Slot>>,
    root: NodeId,
}

impl PageTree {
    /// Build a tree from its nested form.
    pub fn from_node(node: &PageNode) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(node, None);
        tree
    }

    fn alloc(&mut self, node: &PageNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Slot {
            tag: node.tag.clone(),
            attrs: node.attrs.clone(),
            text: node.text.clone(),
            parent,
            children: Vec::new(),
        }));
        let children: Vec<NodeId> = node
            .children
            .iter()
            .map(|child| self.alloc(child, Some(id)))
            .collect();
        if let Some(slot) = self.slots[id.0].as_mut() {
            slot.children = children;
        }
        id
    }

    /// Convert back into the nested form.
    pub fn to_node(&self) -> PageNode {
        self.node_at(self.root)
            .unwrap_or_else(|| PageNode::element("html"))
    }

    /// Nested form of the subtree rooted at `id`.
    pub fn node_at(&self, id: NodeId) -> Option<PageNode> {
        let slot = self.slot(id)?;
        Some(PageNode {
            tag: slot.tag.clone(),
            attrs: slot.attrs.clone(),
            text: slot.text.clone(),
            children: slot
                .children
                .iter()
                .filter_map(|child| self.node_at(*child))
                .collect(),
        })
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` still refers to a node in the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.slot(id).map(|s| s.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.slot(id).and_then(|s| s.text.as_deref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|s| s.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slot(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.slot(id)
            .and_then(|s| s.attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute. Returns `false` if the node no longer exists.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.attrs.insert(name.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    /// Whether the node's `class` attribute contains `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Whether the space-separated attribute `name` contains `token`.
    pub fn attr_has_token(&self, id: NodeId, name: &str, token: &str) -> bool {
        self.attr(id, name)
            .map(|value| value.split_whitespace().any(|t| t == token))
            .unwrap_or(false)
    }

    /// All live nodes in document order (pre-order), root included.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !self.contains(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Nodes matching `pred`, in document order.
    pub fn select<F>(&self, pred: F) -> Vec<NodeId>
    where
        F: Fn(&PageTree, NodeId) -> bool,
    {
        self.descendants()
            .into_iter()
            .filter(|id| pred(self, *id))
            .collect()
    }

    /// First node matching `pred` in document order.
    pub fn select_first<F>(&self, pred: F) -> Option<NodeId>
    where
        F: Fn(&PageTree, NodeId) -> bool,
    {
        self.descendants().into_iter().find(|id| pred(self, *id))
    }

    /// Last node matching `pred` in document order.
    pub fn select_last<F>(&self, pred: F) -> Option<NodeId>
    where
        F: Fn(&PageTree, NodeId) -> bool,
    {
        self.select(pred).pop()
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// All nodes sharing the given `about` value, in document order.
    pub fn about_group(&self, about: &str) -> Vec<NodeId> {
        self.select(|tree, id| tree.attr(id, "about") == Some(about))
    }

    /// Insert `node` relative to `anchor`. Returns the id of the new node, or
    /// `None` if the anchor is gone or has no parent for `AfterEnd`.
    pub fn insert_adjacent(
        &mut self,
        anchor: NodeId,
        position: InsertPosition,
        node: &PageNode,
    ) -> Option<NodeId> {
        if !self.contains(anchor) {
            return None;
        }
        let (parent, index) = match position {
            InsertPosition::AfterBegin => (anchor, 0),
            InsertPosition::AfterEnd => {
                let parent = self.parent(anchor)?;
                let index = self
                    .children(parent)
                    .iter()
                    .position(|c| *c == anchor)?
                    + 1;
                (parent, index)
            }
        };
        let id = self.alloc(node, Some(parent));
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.insert(index, id);
        }
        Some(id)
    }

    /// Detach and drop the subtree rooted at `id`. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(slot) = self.slot_mut(parent) {
                slot.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(node.0).and_then(Option::take) {
                stack.extend(slot.children);
            }
        }
        true
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

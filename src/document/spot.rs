//! Placement of new notices.

use super::Document;
use crate::error::{EditorError, EditorResult};
use crate::notice::DocumentEvent;
use crate::page::transclusion::{DATA_MW, TRANSCLUSION_TYPE};
use crate::page::{
    InsertPosition, NodeId, PageNode, PageTree, ParamValue, TemplateCall, TransclusionData,
};
use crate::title::subject_page;
use tracing::info;

/// Where a new notice goes: `position` relative to `anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionSpot {
    pub position: InsertPosition,
    pub anchor: NodeId,
}

impl InsertionSpot {
    fn after(anchor: NodeId) -> Self {
        Self {
            position: InsertPosition::AfterEnd,
            anchor,
        }
    }
}

fn is_section_zero(tree: &PageTree, id: NodeId) -> bool {
    tree.attr(id, "data-mw-section-id") == Some("0")
}

fn in_section_zero(tree: &PageTree, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    while let Some(node) = current {
        if is_section_zero(tree, node) {
            return true;
        }
        current = tree.parent(node);
    }
    false
}

/// Pick a spot for a new notice. Candidates, first hit wins:
///
/// 1. after the last existing `{{copied}}` notice
/// 2. after the last to-do box
/// 3. after the WikiProject banner shell (its whole transclusion group)
/// 4. after the last WikiProject banner
/// 5. after the last full-size talk page message box in section 0
/// 6. after the talk header
/// 7. at the start of section 0
pub fn find_insertion_spot(tree: &PageTree) -> Option<InsertionSpot> {
    let with_data = |tree: &PageTree, id: NodeId| tree.has_attr(id, DATA_MW);

    if let Some(id) = tree.select_last(|t, id| t.has_class(id, "copiednotice") && with_data(t, id)) {
        return Some(InsertionSpot::after(id));
    }
    if let Some(id) = tree.select_last(|t, id| t.has_class(id, "t-todo")) {
        return Some(InsertionSpot::after(id));
    }
    if let Some(shell) = tree.select_first(|t, id| t.has_class(id, "wpbs")) {
        let last = match tree.attr(shell, "about") {
            Some(about) => tree.about_group(about).pop(),
            None => None,
        };
        if let Some(id) = last {
            return Some(InsertionSpot::after(id));
        }
    }
    if let Some(id) = tree.select_last(|t, id| t.has_class(id, "wpb") && with_data(t, id)) {
        return Some(InsertionSpot::after(id));
    }
    if let Some(id) = tree.select_last(|t, id| {
        t.has_class(id, "tmbox")
            && with_data(t, id)
            && !t.has_class(id, "mbox-small")
            && !t.has_class(id, "talkheader")
            && in_section_zero(t, id)
    }) {
        return Some(InsertionSpot::after(id));
    }
    if let Some(id) = tree.select_first(|t, id| t.has_class(id, "talkheader") && with_data(t, id)) {
        return Some(InsertionSpot::after(id));
    }
    tree.select_first(|t, id| t.tag(id) == Some("section") && is_section_zero(t, id))
        .map(|anchor| InsertionSpot {
            position: InsertPosition::AfterBegin,
            anchor,
        })
}

impl Document {
    /// Spot for a new notice in the loaded page.
    pub fn find_insertion_spot(&self) -> EditorResult<Option<InsertionSpot>> {
        Ok(find_insertion_spot(self.tree()?))
    }

    /// Next unused synthetic group identifier.
    fn next_group_id(&mut self) -> EditorResult<String> {
        loop {
            let about = format!("N{}", self.next_group);
            self.next_group += 1;
            if self.tree()?.about_group(&about).is_empty() {
                return Ok(about);
            }
        }
    }

    /// Node for a new single-row notice crediting the subject page.
    fn new_notice_node(&self, about: &str) -> EditorResult<PageNode> {
        let mut call = TemplateCall::new(
            self.config.new_target.as_str(),
            self.config.new_href.as_str(),
            0,
        );
        call.params.insert(
            "to".to_string(),
            ParamValue::new(subject_page(self.page()?)),
        );
        let data = TransclusionData::single(call)
            .to_json()
            .map_err(EditorError::internal)?;
        Ok(PageNode::element("span")
            .with_attr("about", about)
            .with_attr("typeof", TRANSCLUSION_TYPE)
            .with_attr(DATA_MW, data))
    }

    /// Insert a new notice at `spot`, rescan, and return its identifier.
    ///
    /// An anchor inside a multi-node transclusion is moved to the last node
    /// of that transclusion so the new notice never splits it.
    pub fn insert_new_notice(&mut self, spot: InsertionSpot) -> EditorResult<String> {
        let about = self.next_group_id()?;
        let node = self.new_notice_node(&about)?;

        let tree = self.tree_mut()?;
        let mut anchor = spot.anchor;
        if spot.position == InsertPosition::AfterEnd {
            let group = tree
                .attr(anchor, "about")
                .filter(|about| about.starts_with("#mwt"))
                .map(str::to_string);
            if let Some(last) = group.and_then(|about| tree.about_group(&about).pop()) {
                anchor = last;
            }
        }
        let inserted = tree
            .insert_adjacent(anchor, spot.position, &node)
            .ok_or_else(EditorError::no_insertion_spot)?;

        self.scan()?;
        let id = self
            .notices
            .iter()
            .find(|notice| notice.node() == inserted)
            .map(|notice| notice.id().to_string())
            .ok_or_else(|| EditorError::internal("inserted notice was not recognized"))?;

        info!(page = self.page().unwrap_or_default(), notice = %id, "Inserted notice");
        self.events.emit(&DocumentEvent::Inserted(id.clone()));
        Ok(id)
    }

    /// Insert a new notice at the best available spot.
    pub fn add_notice(&mut self) -> EditorResult<String> {
        let spot = self
            .find_insertion_spot()?
            .ok_or_else(EditorError::no_insertion_spot)?;
        self.insert_new_notice(spot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(class: &str) -> PageNode {
        PageNode::element("table")
            .with_attr("class", class)
            .with_attr(DATA_MW, "{\"parts\":[]}")
    }

    fn page(section: PageNode) -> PageTree {
        PageTree::from_node(
            &PageNode::element("html").with_child(PageNode::element("body").with_child(section)),
        )
    }

    fn section() -> PageNode {
        PageNode::element("section").with_attr("data-mw-section-id", "0")
    }

    #[test]
    fn test_empty_section_gets_after_begin() {
        let tree = page(section());
        let spot = find_insertion_spot(&tree).unwrap();
        assert_eq!(spot.position, InsertPosition::AfterBegin);
        assert_eq!(tree.tag(spot.anchor), Some("section"));
    }

    #[test]
    fn test_no_section_means_no_spot() {
        let tree = PageTree::from_node(&PageNode::element("html"));
        assert!(find_insertion_spot(&tree).is_none());
    }

    #[test]
    fn test_talk_header_then_tmbox() {
        let tree = page(
            section()
                .with_child(banner("tmbox talkheader").with_attr("id", "header"))
                .with_child(banner("tmbox tmbox-notice").with_attr("id", "box1"))
                .with_child(banner("tmbox mbox-small").with_attr("id", "small")),
        );
        let spot = find_insertion_spot(&tree).unwrap();
        assert_eq!(spot.position, InsertPosition::AfterEnd);
        assert_eq!(tree.attr(spot.anchor, "id"), Some("box1"));
    }

    #[test]
    fn test_talk_header_alone() {
        let tree = page(section().with_child(banner("tmbox talkheader").with_attr("id", "header")));
        let spot = find_insertion_spot(&tree).unwrap();
        assert_eq!(tree.attr(spot.anchor, "id"), Some("header"));
    }

    #[test]
    fn test_banner_shell_uses_last_group_node() {
        let tree = page(
            section()
                .with_child(banner("wpbs").with_attr("about", "#mwt5"))
                .with_child(PageNode::element("link").with_attr("about", "#mwt5").with_attr("id", "tail"))
                .with_child(banner("wpb").with_attr("id", "lone")),
        );
        let spot = find_insertion_spot(&tree).unwrap();
        assert_eq!(tree.attr(spot.anchor, "id"), Some("tail"));
    }

    #[test]
    fn test_existing_notice_wins() {
        let tree = page(
            section()
                .with_child(banner("copiednotice").with_attr("id", "c1"))
                .with_child(banner("copiednotice").with_attr("id", "c2"))
                .with_child(banner("t-todo")),
        );
        let spot = find_insertion_spot(&tree).unwrap();
        assert_eq!(tree.attr(spot.anchor, "id"), Some("c2"));
    }
}

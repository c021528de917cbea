//! Local conversion of a page tree to wiki markup.
//!
//! This is a small stand-in for the real page-rendering service, used by the
//! filesystem provider. It reproduces text verbatim, expands each
//! transclusion group once from its `data-mw`, and separates block elements
//! with newlines. Other markup is not reconstructed.

use super::transclusion::{Part, TransclusionData, is_transclusion};
use super::tree::{NodeId, PageNode, PageTree, TEXT_TAG};
use std::collections::HashSet;

const BLOCK_TAGS: &[&str] = &["p", "div", "section", "h1", "h2", "h3", "h4", "h5", "h6", "li"];

/// Convert a nested page node to wiki markup.
pub fn to_wikitext(node: &PageNode) -> String {
    let tree = PageTree::from_node(node);
    let mut out = String::new();
    let mut seen_groups = HashSet::new();
    render(&tree, tree.root(), &mut out, &mut seen_groups);
    let trimmed = out.trim_matches('\n');
    let mut text = trimmed.to_string();
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

fn render(tree: &PageTree, id: NodeId, out: &mut String, seen_groups: &mut HashSet<String>) {
    if let Some(about) = tree.attr(id, "about") {
        // Continuation nodes of an already-expanded transclusion.
        if seen_groups.contains(about) {
            return;
        }
    }

    if tree.tag(id) == Some(TEXT_TAG) {
        out.push_str(tree.text(id).unwrap_or_default());
        return;
    }

    if is_transclusion(tree, id) {
        if let Ok(data) = TransclusionData::read(tree, id) {
            if let Some(about) = tree.attr(id, "about") {
                seen_groups.insert(about.to_string());
            }
            for part in &data.parts {
                render_part(part, out);
            }
            return;
        }
    }

    let block = tree.tag(id).is_some_and(|tag| BLOCK_TAGS.contains(&tag));
    if block && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for child in tree.children(id) {
        render(tree, *child, out, seen_groups);
    }
    if block && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn render_part(part: &Part, out: &mut String) {
    match part {
        Part::Template { template } => {
            out.push_str("{{");
            out.push_str(template.target.wt.trim_end());
            for (key, value) in &template.params {
                out.push_str(&format!("\n| {} = {}", key, value.wt));
            }
            if !template.params.is_empty() {
                out.push('\n');
            }
            out.push_str("}}");
        }
        Part::Other(value) => {
            if let Some(text) = value.as_str() {
                out.push_str(text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::transclusion::{DATA_MW, ParamValue, TemplateCall};

    fn notice_node(about: &str) -> PageNode {
        let mut call = TemplateCall::new("copied\n", "./Template:Copied", 0);
        call.params.insert("from".into(), ParamValue::new("Foo"));
        call.params.insert("to".into(), ParamValue::new("Bar"));
        PageNode::element("span")
            .with_attr("about", about)
            .with_attr("typeof", "mw:Transclusion")
            .with_attr(
                DATA_MW,
                TransclusionData::single(call).to_json().unwrap(),
            )
    }

    #[test]
    fn test_text_and_transclusion() {
        let doc = PageNode::element("body").with_child(
            PageNode::element("section")
                .with_child(notice_node("#mwt1"))
                .with_child(PageNode::element("p").with_child(PageNode::text("Hello"))),
        );
        assert_eq!(
            to_wikitext(&doc),
            "{{copied\n| from = Foo\n| to = Bar\n}}\nHello\n"
        );
    }

    #[test]
    fn test_group_expanded_once() {
        let continuation = PageNode::element("div")
            .with_attr("about", "#mwt1")
            .with_child(PageNode::text("rendered output"));
        let doc = PageNode::element("body")
            .with_child(notice_node("#mwt1"))
            .with_child(continuation);
        let text = to_wikitext(&doc);
        assert_eq!(text.matches("{{copied").count(), 1);
        assert!(!text.contains("rendered output"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(to_wikitext(&PageNode::empty_document()), "");
    }
}

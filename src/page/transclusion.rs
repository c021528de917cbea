//! Transclusion data carried in a node's `data-mw` attribute.
//!
//! ```text
//! { "parts": [
//!     "plain wikitext between calls",
//!     { "template": {
//!         "target": { "wt": "copied", "href": "./Template:Copied" },
//!         "params": { "from": { "wt": "Foo" } },
//!         "i": 0 } }
//! ] }
//! ```

use super::tree::{NodeId, PageTree};
use crate::error::EditorError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute holding the transclusion JSON.
pub const DATA_MW: &str = "data-mw";

/// `typeof` token marking a transclusion node.
pub const TRANSCLUSION_TYPE: &str = "mw:Transclusion";

/// Ordered template parameters.
pub type ParamMap = IndexMap<String, ParamValue>;

/// Errors reading or writing `data-mw`.
#[derive(Debug, thiserror::Error)]
pub enum DataMwError {
    #[error("node has no data-mw attribute")]
    Missing,
    #[error("invalid data-mw JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DataMwError> for EditorError {
    fn from(err: DataMwError) -> Self {
        EditorError::invalid_content(err)
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamValue {
    pub wt: String,
}

impl ParamValue {
    pub fn new(wt: impl Into<String>) -> Self {
        Self { wt: wt.into() }
    }
}

/// Target of a template call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub wt: String,
    /// Link to the template page. Absent for parser functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// One template invocation inside a transclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCall {
    pub target: Target,
    #[serde(default)]
    pub params: ParamMap,
    /// Index of this invocation within its transclusion group.
    pub i: u32,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl TemplateCall {
    pub fn new(target_wt: impl Into<String>, href: impl Into<String>, i: u32) -> Self {
        Self {
            target: Target {
                wt: target_wt.into(),
                href: Some(href.into()),
            },
            params: ParamMap::new(),
            i,
            extra: IndexMap::new(),
        }
    }

    /// Inline call syntax: the target followed by `| key = value` for every
    /// parameter, in parameter order.
    pub fn to_text(&self) -> String {
        let mut text = String::from("{{");
        text.push_str(&self.target.wt);
        for (key, value) in &self.params {
            text.push_str(&format!("| {} = {}\n", key, value.wt));
        }
        text.push_str("}}");
        text
    }
}

/// A part of a transclusion: a template call or anything else, kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Template { template: TemplateCall },
    Other(Value),
}

impl Part {
    pub fn template(&self) -> Option<&TemplateCall> {
        match self {
            Part::Template { template } => Some(template),
            Part::Other(_) => None,
        }
    }
}

/// Parsed contents of a `data-mw` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransclusionData {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl TransclusionData {
    /// Transclusion holding a single template call.
    pub fn single(call: TemplateCall) -> Self {
        Self {
            parts: vec![Part::Template { template: call }],
            extra: IndexMap::new(),
        }
    }

    /// Parse the `data-mw` attribute of `node`.
    pub fn read(tree: &PageTree, node: NodeId) -> Result<Self, DataMwError> {
        let raw = tree.attr(node, DATA_MW).ok_or(DataMwError::Missing)?;
        Ok(serde_json::from_str(raw)?)
    }

    /// Write this value back into the `data-mw` attribute of `node`.
    pub fn write(&self, tree: &mut PageTree, node: NodeId) -> Result<(), DataMwError> {
        let raw = self.to_json()?;
        tree.set_attr(node, DATA_MW, raw);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, DataMwError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Position of the template part with invocation index `i`.
    pub fn position_of(&self, i: u32) -> Option<usize> {
        self.parts
            .iter()
            .position(|part| part.template().is_some_and(|t| t.i == i))
    }

    /// Template calls in part order.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateCall> {
        self.parts.iter().filter_map(Part::template)
    }
}

/// Whether `node` is a transclusion carrying `data-mw`.
pub fn is_transclusion(tree: &PageTree, node: NodeId) -> bool {
    tree.attr_has_token(node, "typeof", TRANSCLUSION_TYPE) && tree.has_attr(node, DATA_MW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::tree::PageNode;

    const RAW: &str = r##"{"parts":["lead ",{"template":{"target":{"wt":"copied","href":"./Template:Copied"},"params":{"from":{"wt":"X"},"date":{"wt":"2020-01-01"}},"i":0}},{"template":{"target":{"wt":"#if:1"},"params":{},"i":1}}]}"##;

    #[test]
    fn test_parse_mixed_parts() {
        let data: TransclusionData = serde_json::from_str(RAW).unwrap();
        assert_eq!(data.parts.len(), 3);
        assert!(matches!(data.parts[0], Part::Other(Value::String(_))));

        let calls: Vec<&TemplateCall> = data.templates().collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].params.keys().collect::<Vec<_>>(), vec!["from", "date"]);
        assert!(calls[1].target.href.is_none());
        assert_eq!(data.position_of(1), Some(2));
        assert_eq!(data.position_of(7), None);
    }

    #[test]
    fn test_to_text_lists_params_in_order() {
        let data: TransclusionData = serde_json::from_str(RAW).unwrap();
        let call = data.templates().next().unwrap();
        assert_eq!(
            call.to_text(),
            "{{copied| from = X\n| date = 2020-01-01\n}}"
        );
    }

    #[test]
    fn test_read_write_attribute() {
        let node = PageNode::element("span")
            .with_attr("typeof", "mw:Transclusion")
            .with_attr(DATA_MW, RAW);
        let mut tree = PageTree::from_node(&node);
        let root = tree.root();
        assert!(is_transclusion(&tree, root));

        let mut data = TransclusionData::read(&tree, root).unwrap();
        data.parts.remove(0);
        data.write(&mut tree, root).unwrap();

        let again = TransclusionData::read(&tree, root).unwrap();
        assert_eq!(again.parts.len(), 2);
    }

    #[test]
    fn test_missing_and_invalid_data() {
        let mut tree = PageTree::from_node(&PageNode::element("span"));
        let root = tree.root();
        assert!(matches!(
            TransclusionData::read(&tree, root),
            Err(DataMwError::Missing)
        ));

        tree.set_attr(root, DATA_MW, "{not json");
        assert!(matches!(
            TransclusionData::read(&tree, root),
            Err(DataMwError::Json(_))
        ));
    }
}

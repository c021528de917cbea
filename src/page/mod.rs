//! Tree-structured page content.
//!
//! - [`tree`]: arena page tree and its nested wire form
//! - [`transclusion`]: the `data-mw` structure of transclusion nodes
//! - [`markup`]: local tree-to-markup conversion

pub mod markup;
pub mod transclusion;
pub mod tree;

pub use transclusion::{ParamMap, ParamValue, Part, TemplateCall, TransclusionData};
pub use tree::{InsertPosition, NodeId, PageNode, PageTree};

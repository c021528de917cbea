//! Extraction of revision ids from diff links.
//!
//! A row's `diff` field often holds a full URL. Both the query form
//! (`index.php?title=X&diff=2&oldid=1`) and the `Special:Diff/1/2` path form
//! are understood.

use super::row::RowField;
use crate::title::display_title;
use regex_lite::Regex;
use std::sync::OnceLock;

/// Revision ids and page found in a diff link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffLink {
    pub oldid: Option<String>,
    pub diff: Option<String>,
    pub title: Option<String>,
}

impl DiffLink {
    /// Row fields this link supplies, in `to_oldid`, `to_diff`, `to` order.
    pub fn fields(&self) -> Vec<(RowField, String)> {
        [
            (RowField::ToOldid, &self.oldid),
            (RowField::ToDiff, &self.diff),
            (RowField::To, &self.title),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }

    fn is_empty(&self) -> bool {
        self.oldid.is_none() && self.diff.is_none() && self.title.is_none()
    }
}

fn special_diff() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/wiki/Special:Diff/(prev|next|\d+)(?:/(prev|next|\d+))?").ok())
        .as_ref()
}

fn decode_query_value(value: &str) -> Option<String> {
    urlencoding::decode(&value.replace('+', " "))
        .ok()
        .map(|s| s.into_owned())
}

/// Parse a diff link. Returns `None` when the value carries no revision
/// ids or title.
pub fn parse_diff_link(value: &str) -> Option<DiffLink> {
    let value = value.trim();
    let value = value.split_once('#').map_or(value, |(before, _)| before);
    let (path, query) = value.split_once('?').unwrap_or((value, ""));

    let mut link = DiffLink::default();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let Some(decoded) = decode_query_value(raw).filter(|v| !v.is_empty()) else {
            continue;
        };
        match key {
            "oldid" => link.oldid = Some(decoded),
            "diff" => link.diff = Some(decoded),
            "title" => link.title = Some(display_title(&decoded)),
            _ => {}
        }
    }

    if let Some(caps) = special_diff().and_then(|re| re.captures(path)) {
        match (caps.get(1), caps.get(2)) {
            (Some(first), Some(second)) => {
                link.oldid = Some(first.as_str().to_string());
                link.diff = Some(second.as_str().to_string());
            }
            (Some(first), None) => link.diff = Some(first.as_str().to_string()),
            _ => {}
        }
    }

    (!link.is_empty()).then_some(link)
}

//! A single attribution record within a `{{copied}}` notice.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named fields of a row, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowField {
    /// The article content was copied from.
    From,
    /// Revision of `from` the content was taken from.
    FromOldid,
    /// The article content was copied into.
    To,
    /// Revision of the copying edit.
    ToDiff,
    /// Revision before the copying edit, for multi-edit copies.
    ToOldid,
    /// URL of the copying diff. Overrides `to_diff` and `to_oldid`.
    Diff,
    /// When the copy happened.
    Date,
    /// Deletion discussion that led to the copy.
    Afd,
    /// Merge discussion that led to the copy.
    Merge,
}

impl RowField {
    pub const ALL: [RowField; 9] = [
        RowField::From,
        RowField::FromOldid,
        RowField::To,
        RowField::ToDiff,
        RowField::ToOldid,
        RowField::Diff,
        RowField::Date,
        RowField::Afd,
        RowField::Merge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowField::From => "from",
            RowField::FromOldid => "from_oldid",
            RowField::To => "to",
            RowField::ToDiff => "to_diff",
            RowField::ToOldid => "to_oldid",
            RowField::Diff => "diff",
            RowField::Date => "date",
            RowField::Afd => "afd",
            RowField::Merge => "merge",
        }
    }

    /// Whether the field holds a revision number.
    pub fn is_revision(&self) -> bool {
        matches!(
            self,
            RowField::FromOldid | RowField::ToDiff | RowField::ToOldid
        )
    }
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown row field '{}'. Valid fields: {}",
                    s,
                    RowField::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

/// Field values of a row. Blank values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_oldid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_oldid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<String>,
}

impl RowFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder pattern).
    pub fn with(mut self, field: RowField, value: impl Into<String>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    pub fn get(&self, field: RowField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set or clear a field. Whitespace-only values clear it.
    pub fn set(&mut self, field: RowField, value: Option<String>) {
        *self.slot_mut(field) = value.filter(|v| !v.trim().is_empty());
    }

    fn slot(&self, field: RowField) -> &Option<String> {
        match field {
            RowField::From => &self.from,
            RowField::FromOldid => &self.from_oldid,
            RowField::To => &self.to,
            RowField::ToDiff => &self.to_diff,
            RowField::ToOldid => &self.to_oldid,
            RowField::Diff => &self.diff,
            RowField::Date => &self.date,
            RowField::Afd => &self.afd,
            RowField::Merge => &self.merge,
        }
    }

    fn slot_mut(&mut self, field: RowField) -> &mut Option<String> {
        match field {
            RowField::From => &mut self.from,
            RowField::FromOldid => &mut self.from_oldid,
            RowField::To => &mut self.to,
            RowField::ToDiff => &mut self.to_diff,
            RowField::ToOldid => &mut self.to_oldid,
            RowField::Diff => &mut self.diff,
            RowField::Date => &mut self.date,
            RowField::Afd => &mut self.afd,
            RowField::Merge => &mut self.merge,
        }
    }

    /// Drop blank values. Fields built through struct literals or serde may
    /// carry them.
    pub fn normalized(mut self) -> Self {
        for field in RowField::ALL {
            let value = self.slot_mut(field).take();
            self.set(field, value);
        }
        self
    }

    /// Present fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RowField, &str)> {
        RowField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Opaque row identifier, unique within a document session. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh [`RowId`]s.
#[derive(Debug, Clone, Default)]
pub struct RowIdSequence {
    next: u64,
}

impl RowIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> RowId {
        self.next += 1;
        RowId(format!("row-{}", self.next))
    }
}

/// Non-fatal problem with a stored field value. The value is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    pub field: RowField,
    pub message: String,
}

/// Edit summary text crediting a row's source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributionSummary {
    pub text: String,
    /// `from` is missing, so the summary does not name the source page.
    pub lacking: bool,
}

/// One attribution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: RowId,
    owner: String,
    fields: RowFields,
}

impl Row {
    /// Create a row owned by the notice `owner`. Blank fields are dropped.
    pub fn new(fields: RowFields, owner: &str, ids: &mut RowIdSequence) -> Self {
        Self {
            id: ids.next_id(),
            owner: owner.to_string(),
            fields: fields.normalized(),
        }
    }

    /// Copy of this row with a fresh id, owned by `owner`.
    pub fn clone_into(&self, owner: &str, ids: &mut RowIdSequence) -> Self {
        Self::new(self.fields.clone(), owner, ids)
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    /// Identifier of the owning notice.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: &str) {
        self.owner = owner.to_string();
    }

    pub fn fields(&self) -> &RowFields {
        &self.fields
    }

    pub fn get(&self, field: RowField) -> Option<&str> {
        self.fields.get(field)
    }

    pub(crate) fn set(&mut self, field: RowField, value: Option<String>) {
        self.fields.set(field, value);
    }

    /// Short label: `<from> to <to>`, with `???` for missing pages.
    pub fn label(&self) -> String {
        format!(
            "{} to {}",
            self.get(RowField::From).unwrap_or("???"),
            self.get(RowField::To).unwrap_or("???")
        )
    }

    /// Problems with stored values: unreadable dates and non-numeric
    /// revision ids.
    pub fn warnings(&self) -> Vec<FieldWarning> {
        let mut warnings = Vec::new();
        for (field, value) in self.fields.iter() {
            if field == RowField::Date && parse_date(value).is_none() {
                warnings.push(FieldWarning {
                    field,
                    message: format!("Unrecognized date: {}", value.trim()),
                });
            } else if field.is_revision() && !value.trim().chars().all(|c| c.is_ascii_digit()) {
                warnings.push(FieldWarning {
                    field,
                    message: format!("Revision id is not numeric: {}", value.trim()),
                });
            }
        }
        warnings
    }

    /// Edit summary crediting this row's source page and revisions.
    pub fn attribution_summary(&self) -> AttributionSummary {
        let mut text = String::from("Attribution: Content partially copied");
        let from = self.get(RowField::From);
        let from_oldid = self.get(RowField::FromOldid);
        let to_diff = self.get(RowField::ToDiff);
        let to_oldid = self.get(RowField::ToOldid);

        let lacking = from.is_none();
        match from {
            Some(from) => text.push_str(&format!(" from [[{}]]", from)),
            None if from_oldid.is_some() => text.push_str(" from a page"),
            None => {}
        }
        if let Some(oldid) = from_oldid {
            text.push_str(&format!(
                " as of revision [[Special:Diff/{}|{}]]",
                oldid, oldid
            ));
        }
        if let (Some(first), Some(second)) = (to_oldid.or(to_diff), to_diff.or(to_oldid)) {
            let diff = if first == second {
                first.to_string()
            } else {
                format!("{}/{}", first, second)
            };
            text.push_str(&format!(" with [[Special:Diff/{}|this edit]]", diff));
        }
        if let Some(from) = from {
            text.push_str(&format!(
                "; refer to that page's [[Special:PageHistory/{}|edit history]] for additional attribution",
                from
            ));
        }
        text.push('.');

        AttributionSummary { text, lacking }
    }
}

/// Parse the date formats commonly written into notices.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%d %B %Y",
        "%B %d, %Y",
        "%B %d %Y",
        "%d %b %Y",
        "%b %d, %Y",
        "%Y/%m/%d",
    ];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%H:%M, %d %B %Y",
    ];

    let value = value.trim().trim_end_matches(" (UTC)");
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

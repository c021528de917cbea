//! Output formatting for notices, as markdown or JSON.

use crate::document::Document;
use crate::notice::{CopiedTemplate, Row};
use serde_json::{Value, json};
use std::str::FromStr;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Format one row as a markdown list item with nested field lines.
pub fn format_row_markdown(row: &Row) -> String {
    let mut md = format!("- `{}` {}\n", row.id(), row.label());
    for (field, value) in row.fields().iter() {
        md.push_str(&format!("  - **{}**: {}\n", field, value));
    }
    for warning in row.warnings() {
        md.push_str(&format!("  - *warning* ({}): {}\n", warning.field, warning.message));
    }
    md
}

/// Format a single notice as markdown.
pub fn format_notice_markdown(notice: &CopiedTemplate) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Notice: {}\n", notice.id()));
    if notice.collapsed() {
        md.push_str("- **collapsed**: yes\n");
    }
    if notice.small() {
        md.push_str("- **small**: yes\n");
    }
    md.push_str(&format!("- **rows**: {}\n", notice.rows().len()));

    if !notice.rows().is_empty() {
        md.push('\n');
        for row in notice.rows() {
            md.push_str(&format_row_markdown(row));
        }
    }

    md
}

/// Format every notice of a document as markdown.
pub fn format_document_markdown(doc: &Document) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "# {} ({} notices)\n",
        doc.page().unwrap_or("(not loaded)"),
        doc.notices().len()
    ));
    if doc.not_found() {
        md.push_str("\n*Page does not exist yet.*\n");
    }

    for notice in doc.notices() {
        md.push('\n');
        md.push_str(&format_notice_markdown(notice));
    }

    md
}

fn row_json(row: &Row) -> Value {
    json!({
        "id": row.id().as_str(),
        "fields": row.fields(),
        "warnings": row.warnings(),
    })
}

/// JSON view of a notice.
pub fn notice_json(notice: &CopiedTemplate) -> Value {
    json!({
        "id": notice.id(),
        "collapsed": notice.collapsed(),
        "small": notice.small(),
        "rows": notice.rows().iter().map(row_json).collect::<Vec<_>>(),
    })
}

/// JSON view of a document.
pub fn document_json(doc: &Document) -> Value {
    json!({
        "page": doc.page().ok(),
        "not_found": doc.not_found(),
        "original_notice_count": doc.original_notice_count(),
        "notices": doc.notices().iter().map(notice_json).collect::<Vec<_>>(),
    })
}

/// Format a document in the requested format.
pub fn format_document(doc: &Document, format: OutputFormat) -> String {
    match format {
        OutputFormat::Markdown => format_document_markdown(doc),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&document_json(doc)).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{RowField, RowFields, RowIdSequence};

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_row_markdown_includes_warnings() {
        let mut ids = RowIdSequence::new();
        let row = Row::new(
            RowFields::new()
                .with(RowField::From, "Foo")
                .with(RowField::Date, "sometime"),
            "1-0",
            &mut ids,
        );
        let md = format_row_markdown(&row);
        assert!(md.starts_with("- `row-1` Foo to ???\n"));
        assert!(md.contains("  - **from**: Foo\n"));
        assert!(md.contains("*warning* (date)"));
    }

    #[test]
    fn test_unloaded_document() {
        let doc = Document::default();
        let md = format_document_markdown(&doc);
        assert!(md.starts_with("# (not loaded) (0 notices)"));
        let json = document_json(&doc);
        assert_eq!(json["page"], Value::Null);
        assert_eq!(json["notices"], json!([]));
    }
}

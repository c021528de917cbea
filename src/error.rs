//! Structured error types for editor operations.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Contract violations
    MalformedNode,
    InvalidContent,

    // Not found errors
    NoticeNotFound,
    RowNotFound,
    NoInsertionSpot,

    // Session state errors
    PageNotLoaded,
    PageAlreadyLoaded,

    // Collaborator errors
    FetchFailed,
    ConversionFailed,
    PersistFailed,
    VersionMismatch,
    RenderFailed,

    // Internal errors
    InternalError,
}

/// Structured error for editor operations.
#[derive(Debug, Serialize)]
pub struct EditorError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EditorError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn malformed_node(notice: &str, index: u32) -> Self {
        Self::new(
            ErrorCode::MalformedNode,
            format!("Template part {} not found for notice {}", index, notice),
        )
    }

    pub fn invalid_content(reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidContent, reason.to_string())
    }

    pub fn notice_not_found(notice: &str) -> Self {
        Self::new(
            ErrorCode::NoticeNotFound,
            format!("Notice not found: {}", notice),
        )
    }

    pub fn row_not_found(row: &str) -> Self {
        Self::new(ErrorCode::RowNotFound, format!("Row not found: {}", row))
    }

    pub fn no_insertion_spot() -> Self {
        Self::new(
            ErrorCode::NoInsertionSpot,
            "Document has no spot for a new notice",
        )
    }

    pub fn page_not_loaded() -> Self {
        Self::new(ErrorCode::PageNotLoaded, "No page is loaded")
    }

    pub fn page_already_loaded(page: &str) -> Self {
        Self::new(
            ErrorCode::PageAlreadyLoaded,
            format!("Page {} already loaded; reload to discard edits", page),
        )
    }

    pub fn fetch_failed(page: &str, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::FetchFailed,
            format!("Failed to fetch {}", page),
        )
        .with_details(err.to_string())
    }

    pub fn conversion_failed(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ConversionFailed, err.to_string())
    }

    pub fn persist_failed(page: &str, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::PersistFailed,
            format!("Failed to save {}", page),
        )
        .with_details(err.to_string())
    }

    pub fn version_mismatch(page: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            ErrorCode::VersionMismatch,
            format!("{} was modified since it was loaded", page),
        )
        .with_details(format!("expected version {}, found {}", expected, actual))
    }

    pub fn render_failed(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::RenderFailed, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EditorError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for EditorError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<EditorError>() {
            Ok(editor_err) => editor_err,
            Err(err) => EditorError::internal(err),
        }
    }
}

impl From<std::io::Error> for EditorError {
    fn from(err: std::io::Error) -> Self {
        EditorError::internal(err)
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_code() {
        let err = EditorError::notice_not_found("12-0");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOTICE_NOT_FOUND");
        assert!(json.get("field").is_none());
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_code() {
        let err: anyhow::Error = EditorError::page_not_loaded().into();
        let back: EditorError = err.into();
        assert_eq!(back.code, ErrorCode::PageNotLoaded);

        let other: EditorError = anyhow::anyhow!("boom").into();
        assert_eq!(other.code, ErrorCode::InternalError);
        assert_eq!(other.to_string(), "boom");
    }

    #[test]
    fn test_version_mismatch_details() {
        let err = EditorError::version_mismatch("Talk:Foo", "3", "4");
        assert_eq!(err.code, ErrorCode::VersionMismatch);
        assert!(err.details.unwrap().contains("expected version 3"));
    }
}

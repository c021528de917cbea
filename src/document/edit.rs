//! Row and notice mutations.

use super::Document;
use crate::error::{EditorError, EditorResult};
use crate::notice::{DocumentEvent, Row, RowField, RowFields, RowId, parse_diff_link};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How [`Document::merge`] treats the source notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Destroy the source notice afterwards.
    #[serde(default)]
    pub delete: bool,
    /// Move rows instead of copying them, leaving the source empty.
    #[serde(default)]
    pub clear: bool,
}

impl Document {
    /// Append a new row to `notice`.
    pub fn add_row(&mut self, notice: &str, fields: RowFields) -> EditorResult<RowId> {
        let row = Row::new(fields, notice, &mut self.row_ids);
        let id = row.id().clone();
        let tree = self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)?;
        let target = self
            .notices
            .iter_mut()
            .find(|n| n.id() == notice)
            .ok_or_else(|| EditorError::notice_not_found(notice))?;
        target.add_row(tree, row)?;
        Ok(id)
    }

    /// Remove a row from `notice`. A missing notice or row is a no-op.
    pub fn delete_row(&mut self, notice: &str, row: &RowId) -> EditorResult<Option<Row>> {
        let Some(tree) = self.tree.as_mut() else {
            return Ok(None);
        };
        let Some(owner) = self.notices.iter_mut().find(|n| n.id() == notice) else {
            debug!(notice, "Delete on missing notice ignored");
            return Ok(None);
        };
        owner.delete_row(tree, row)
    }

    /// Set or clear a field on a row, wherever it lives.
    pub fn set_row_field(
        &mut self,
        row: &RowId,
        field: RowField,
        value: Option<String>,
    ) -> EditorResult<()> {
        let tree = self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)?;
        let owner = self
            .notices
            .iter_mut()
            .find(|n| n.contains_row(row))
            .ok_or_else(|| EditorError::row_not_found(row.as_str()))?;
        owner.set_row_field(tree, row, field, value)
    }

    /// Fill `to_oldid`, `to_diff` and `to` of a row from the link in its
    /// `diff` field. Returns the fields that were written.
    pub fn convert_diff(&mut self, row: &RowId) -> EditorResult<Vec<(RowField, String)>> {
        let (_, current) = self
            .find_row(row)
            .ok_or_else(|| EditorError::row_not_found(row.as_str()))?;
        let link = current
            .get(RowField::Diff)
            .and_then(parse_diff_link)
            .ok_or_else(|| {
                EditorError::invalid_content("diff field does not hold a diff link")
                    .with_field(RowField::Diff.as_str())
            })?;

        let changes = link.fields();
        for (field, value) in &changes {
            self.set_row_field(row, *field, Some(value.clone()))?;
        }
        debug!(row = %row, changes = changes.len(), "Converted diff link");
        Ok(changes)
    }

    pub fn set_flags(&mut self, notice: &str, collapsed: bool, small: bool) -> EditorResult<()> {
        let tree = self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)?;
        let target = self
            .notices
            .iter_mut()
            .find(|n| n.id() == notice)
            .ok_or_else(|| EditorError::notice_not_found(notice))?;
        target.set_flags(tree, collapsed, small)
    }

    /// Reassign a row to another notice, keeping its id.
    ///
    /// The row leaves its owner (which saves and reports the deletion) and
    /// joins `target` (which saves and reports the addition). Moving a row
    /// to its current owner does nothing.
    pub fn move_row(&mut self, row: &RowId, target: &str) -> EditorResult<()> {
        let source = self
            .notices
            .iter()
            .position(|n| n.contains_row(row))
            .ok_or_else(|| EditorError::row_not_found(row.as_str()))?;
        let target = self
            .notice_index(target)
            .ok_or_else(|| EditorError::notice_not_found(target))?;
        if source == target {
            return Ok(());
        }

        let tree = self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)?;
        let moved = self.notices[source]
            .delete_row(tree, row)?
            .ok_or_else(|| EditorError::row_not_found(row.as_str()))?;
        self.notices[target].add_row(tree, moved)
    }

    /// Bring the rows of `from` into `into`.
    ///
    /// Rows are copied with fresh ids unless `clear` is set, in which case
    /// they are moved. With `delete`, `from` is destroyed afterwards.
    /// Merging a notice into itself, or from a notice that no longer
    /// exists, does nothing.
    pub fn merge(&mut self, into: &str, from: &str, options: MergeOptions) -> EditorResult<()> {
        if into == from {
            return Ok(());
        }
        let Some(from_index) = self.notice_index(from) else {
            debug!(from, "Merge from missing notice ignored");
            return Ok(());
        };
        let into_index = self
            .notice_index(into)
            .ok_or_else(|| EditorError::notice_not_found(into))?;

        if options.clear {
            let rows: Vec<RowId> = self.notices[from_index]
                .rows()
                .iter()
                .map(|row| row.id().clone())
                .collect();
            for row in &rows {
                self.move_row(row, into)?;
            }
        } else {
            let copies: Vec<Row> = self.notices[from_index]
                .rows()
                .iter()
                .map(|row| row.clone_into(into, &mut self.row_ids))
                .collect();
            let tree = self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)?;
            for row in copies {
                self.notices[into_index].add_row(tree, row)?;
            }
        }

        info!(into, from, delete = options.delete, clear = options.clear, "Merged notices");
        if options.delete {
            self.destroy_notice(from)?;
        }
        Ok(())
    }

    /// Remove a notice from the page and from the notice list.
    pub fn destroy_notice(&mut self, notice: &str) -> EditorResult<()> {
        let index = self
            .notice_index(notice)
            .ok_or_else(|| EditorError::notice_not_found(notice))?;
        let tree = self.tree.as_mut().ok_or_else(EditorError::page_not_loaded)?;
        // Fail before the notice leaves the list if its part is gone.
        self.notices[index].read_call(tree)?;
        let removed = self.notices.remove(index);
        removed.destroy(tree)?;
        self.events
            .emit(&DocumentEvent::NoticeDestroyed(notice.to_string()));
        Ok(())
    }

    /// Merge every notice into the first one, destroying the rest.
    pub fn merge_all(&mut self) -> EditorResult<()> {
        let Some((first, rest)) = self.notices.split_first() else {
            return Ok(());
        };
        let first = first.id().to_string();
        let rest: Vec<String> = rest.iter().map(|n| n.id().to_string()).collect();
        for other in rest {
            self.merge(
                &first,
                &other,
                MergeOptions {
                    delete: true,
                    clear: false,
                },
            )?;
        }
        Ok(())
    }

    /// Destroy every notice.
    pub fn destroy_all(&mut self) -> EditorResult<()> {
        let ids: Vec<String> = self.notices.iter().map(|n| n.id().to_string()).collect();
        for id in ids {
            self.destroy_notice(&id)?;
        }
        Ok(())
    }
}

//! Arguments for the subcommands that change a page.

use super::view::PageArgs;
use crate::notice::{RowField, RowFields};
use clap::Args;

/// Whether to persist the result.
#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Print the resulting wiki markup instead of saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Field values for a row. Omitted fields stay unset.
#[derive(Args, Debug, Clone, Default)]
pub struct RowFieldArgs {
    /// Article the content was copied from
    #[arg(long)]
    pub from: Option<String>,

    /// Revision of the source article
    #[arg(long)]
    pub from_oldid: Option<String>,

    /// Article the content was copied to
    #[arg(long)]
    pub to: Option<String>,

    /// Revision of the copying edit
    #[arg(long)]
    pub to_diff: Option<String>,

    /// Revision before the copying edit
    #[arg(long)]
    pub to_oldid: Option<String>,

    /// URL of the copying diff
    #[arg(long)]
    pub diff: Option<String>,

    /// Date of the copy
    #[arg(long)]
    pub date: Option<String>,

    /// Deletion discussion that led to the copy
    #[arg(long)]
    pub afd: Option<String>,

    /// Merge discussion that led to the copy
    #[arg(long)]
    pub merge: Option<String>,
}

impl RowFieldArgs {
    /// Pairs of field and given value, in canonical field order.
    pub fn values(&self) -> Vec<(RowField, String)> {
        let given = [
            (RowField::From, &self.from),
            (RowField::FromOldid, &self.from_oldid),
            (RowField::To, &self.to),
            (RowField::ToDiff, &self.to_diff),
            (RowField::ToOldid, &self.to_oldid),
            (RowField::Diff, &self.diff),
            (RowField::Date, &self.date),
            (RowField::Afd, &self.afd),
            (RowField::Merge, &self.merge),
        ];
        given
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
            .collect()
    }

    pub fn to_fields(&self) -> RowFields {
        self.values()
            .into_iter()
            .fold(RowFields::new(), |fields, (field, value)| fields.with(field, value))
    }
}

/// Arguments for the add subcommand
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Add a row to this notice instead of inserting a new notice
    #[arg(short, long, value_name = "ID")]
    pub notice: Option<String>,

    #[command(flatten)]
    pub fields: RowFieldArgs,

    /// Collapse the notice
    #[arg(long)]
    pub collapse: bool,

    /// Show the notice in small form
    #[arg(long)]
    pub small: bool,

    #[command(flatten)]
    pub save: SaveArgs,
}

/// Arguments for the merge subcommand
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Notice receiving the rows
    #[arg(long, value_name = "ID", required_unless_present = "all", requires = "from")]
    pub into: Option<String>,

    /// Notice giving up its rows
    #[arg(long, value_name = "ID")]
    pub from: Option<String>,

    /// Merge every notice into the first one
    #[arg(long, conflicts_with_all = ["into", "from"])]
    pub all: bool,

    /// Keep the source notice after merging
    #[arg(long)]
    pub keep: bool,

    /// Move rows instead of copying them
    #[arg(long = "move")]
    pub r#move: bool,

    #[command(flatten)]
    pub save: SaveArgs,
}

/// Arguments for the convert-diff subcommand
#[derive(Args, Debug, Clone)]
pub struct RowArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Notice holding the row
    #[arg(short, long, value_name = "ID")]
    pub notice: String,

    /// Position of the row (1-based)
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub row: usize,

    #[command(flatten)]
    pub save: SaveArgs,
}

/// Arguments for the remove subcommand
#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Notice to remove, or to remove a row from with `--row`
    #[arg(short, long, value_name = "ID", required_unless_present = "all")]
    pub notice: Option<String>,

    /// Position of the row to remove (1-based)
    #[arg(short, long, value_name = "N", requires = "notice")]
    pub row: Option<usize>,

    /// Remove every notice on the page
    #[arg(long, conflicts_with_all = ["notice", "row"])]
    pub all: bool,

    #[command(flatten)]
    pub save: SaveArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_values_in_order() {
        let args = RowFieldArgs {
            date: Some("2020-01-01".to_string()),
            from: Some("A".to_string()),
            to: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.values(),
            vec![
                (RowField::From, "A".to_string()),
                (RowField::To, "   ".to_string()),
                (RowField::Date, "2020-01-01".to_string()),
            ]
        );
        // Blank values are not stored.
        assert_eq!(args.to_fields().get(RowField::To), None);
    }
}

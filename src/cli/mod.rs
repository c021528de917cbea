//! CLI command definitions for `cte`.
//!
//! Every command works on one page of the local page store. Commands that
//! change the page save it unless `--dry-run` is given.

pub mod edit;
pub mod view;

use clap::{Parser, Subcommand};
use edit::{AddArgs, MergeArgs, RemoveArgs, RowArgs};
use std::path::PathBuf;
use view::{NoticeArgs, PageArgs};

/// Editor for `{{copied}}` attribution notices on talk pages
#[derive(Parser, Debug)]
#[command(name = "cte", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of the local page store (overrides config)
    #[arg(short, long, global = true)]
    pub pages_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: markdown (default) or json
    #[arg(short, long, default_value = "markdown", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the notices on a page
    List(PageArgs),

    /// Add a row to a notice, or insert a new notice
    Add(AddArgs),

    /// Merge notices
    Merge(MergeArgs),

    /// Remove notices or rows
    Remove(RemoveArgs),

    /// Fill a row's revision fields from the link in its diff field
    ConvertDiff(RowArgs),

    /// Print a notice's template call
    Text(NoticeArgs),

    /// Print attribution edit summaries for a notice's rows
    Attribution(NoticeArgs),

    /// Print the page as wiki markup
    Wikitext(PageArgs),

    /// Render a preview of a notice
    Preview(NoticeArgs),
}

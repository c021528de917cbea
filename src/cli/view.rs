//! Arguments shared by the read-only subcommands.

use clap::Args;

/// A page in the local store.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page title, e.g. "Talk:Example"
    #[arg(value_name = "PAGE")]
    pub page: String,
}

/// A page and, optionally, one notice on it.
#[derive(Args, Debug, Clone)]
pub struct NoticeArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Notice identifier as shown by `list` (default: every notice)
    #[arg(short, long, value_name = "ID")]
    pub notice: Option<String>,
}

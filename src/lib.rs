//! Copied Notice Editor Library
//!
//! Model and editing operations for `{{copied}}` attribution notices on
//! talk pages, plus the local providers used by the `cte` binary.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod logging;
pub mod notice;
pub mod page;
pub mod preview;
pub mod provider;
pub mod title;

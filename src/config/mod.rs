//! Editor configuration.
//!
//! Tiers, merged field by field from lowest to highest priority:
//! 1. **Defaults** - built in
//! 2. **Project** - `$CWD/cte/config.yaml`
//! 3. **User** - `~/.cte/config.yaml`
//! 4. **Environment** - overrides below
//!
//! ## Environment Variables
//! - `CTE_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `CTE_PROJECT_DIR` - Project config dir (default: `./cte`)
//! - `CTE_USER_DIR` - User config dir (default: `~/.cte`)
//! - `CTE_PAGES_DIR` - Local page store directory

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;

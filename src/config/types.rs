//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notice: NoticeConfig,

    #[serde(default)]
    pub edit: EditConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Recognition and creation of `{{copied}}` notices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Template pages recognized as notices. Compared case-insensitively,
    /// with spaces and underscores treated alike.
    #[serde(default = "default_aliases")]
    pub aliases: Vec<String>,

    /// Target wikitext written for newly inserted notices.
    #[serde(default = "default_new_target")]
    pub new_target: String,

    /// Target link written for newly inserted notices.
    #[serde(default = "default_new_href")]
    pub new_href: String,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            new_target: default_new_target(),
            new_href: default_new_href(),
        }
    }
}

fn default_aliases() -> Vec<String> {
    vec![
        "Template:Copied".to_string(),
        "Template:Copied from".to_string(),
        "Template:Copywithin".to_string(),
    ]
}

fn default_new_target() -> String {
    "copied\n".to_string()
}

fn default_new_href() -> String {
    "./Template:Copied".to_string()
}

/// Normalize a template link or alias for comparison.
pub fn normalize_template_name(name: &str) -> String {
    name.trim()
        .trim_start_matches("./")
        .to_lowercase()
        .replace(' ', "_")
}

impl NoticeConfig {
    /// Whether a template link names one of the notice aliases.
    pub fn matches(&self, href: &str) -> bool {
        let href = normalize_template_name(href);
        self.aliases
            .iter()
            .any(|alias| normalize_template_name(alias) == href)
    }
}

/// Edit summary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditConfig {
    /// Text appended to every edit summary.
    #[serde(default = "default_advert")]
    pub advert: String,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            advert: default_advert(),
        }
    }
}

fn default_advert() -> String {
    "([[User:Chlod/CTE|CopiedTemplateEditor]])".to_string()
}

/// Local page store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding stored pages.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
        }
    }
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("cte/pages")
}

/// Preview refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Minimum time between preview renders in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

fn default_refresh_interval_ms() -> u64 {
    1_000
}

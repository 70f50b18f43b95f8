//! Site configuration persistence.
//!
//! The configuration lives in `<lib>/site-config/data.json`, where `<lib>` is
//! `<root>/src/lib` when `<root>/src` is a directory and `<root>/lib`
//! otherwise. Public operations never fail loudly: reads yield `None` and
//! writes yield an [`ActionResult`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Success!";
pub const FAILURE_MESSAGE: &str = "Failed";

/// Site metadata edited through the dev-mode form. Missing keys read as
/// empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub url: String,
    pub author_name: String,
    pub author_url: String,
}

impl SiteConfig {
    /// The configuration a fresh project starts with.
    pub fn starter() -> Self {
        Self {
            title: "Fancy".to_string(),
            description: "How fancy the web can be!".to_string(),
            url: "http://localhost:3000".to_string(),
            author_name: "StepAsideLiL".to_string(),
            author_url: "https://github.com/StepAsideLiL".to_string(),
        }
    }
}

/// Outcome of a persistence action, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            message: FAILURE_MESSAGE.to_string(),
        }
    }
}

impl<T> From<Result<T>> for ActionResult {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(_) => Self::succeeded(),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "site config action failed");
                Self::failed()
            }
        }
    }
}

/// Library directory under `root`.
pub fn lib_dir(root: &Path) -> PathBuf {
    let src = root.join("src");
    if src.is_dir() {
        src.join("lib")
    } else {
        root.join("lib")
    }
}

pub fn site_config_path(root: &Path) -> PathBuf {
    lib_dir(root).join("site-config").join("data.json")
}

/// Read the site configuration under `root`.
///
/// Returns `None` when the file is missing, unreadable or not a valid
/// configuration.
pub fn read_site_config(root: &Path) -> Option<SiteConfig> {
    let path = site_config_path(root);
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no site config");
        return None;
    }
    match load_site_config(&path) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable site config");
            None
        }
    }
}

/// Write `config` under `root`, creating directories and replacing any
/// existing file.
pub fn write_site_config(root: &Path, config: &SiteConfig) -> ActionResult {
    save_site_config(&site_config_path(root), config).into()
}

/// Write the starter configuration unless a configuration file already
/// exists. An existing file counts as success.
pub fn ensure_site_config(root: &Path) -> ActionResult {
    let path = site_config_path(root);
    if path.is_file() {
        return ActionResult::succeeded();
    }
    save_site_config(&path, &SiteConfig::starter()).into()
}

fn load_site_config(path: &Path) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read site config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse site config {}", path.display()))
}

fn save_site_config(path: &Path, config: &SiteConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(config).context("Failed to serialize site config")?;
    fs::write(path, json).with_context(|| format!("Failed to write site config {}", path.display()))
}

//! Application configuration for bylines.
//!
//! Config lives in a project-local `bylines.toml` next to the site being
//! built. CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BylinesError, Result};

/// Default configuration file name, resolved relative to the project root.
pub const CONFIG_FILE_NAME: &str = "bylines.toml";

/// Host used when no enterprise hostname is configured.
const PUBLIC_HOST_URL: &str = "https://github.com/";

// ---------------------------------------------------------------------------
// Config struct (matching bylines.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Enterprise git host name. Empty means the public host.
    #[serde(default)]
    pub enterprise_hostname: String,

    /// `owner/repo` identifier of the repository holding the docs.
    /// Required; an empty value degrades the session to inactive.
    #[serde(default)]
    pub repository: String,

    /// Branch the contributors listing is fetched from.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Prefix prepended to a page's source path to form its
    /// repository-relative path.
    #[serde(default = "default_docs_path")]
    pub docs_path: String,

    /// API token. Accepted for forward compatibility; the scraping path
    /// does not use it.
    #[serde(default)]
    pub token: String,

    /// Glob patterns for pages to skip.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Master switch for the whole feature.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding the page-authors cache file.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enterprise_hostname: String::new(),
            repository: String::new(),
            branch: default_branch(),
            docs_path: default_docs_path(),
            token: String::new(),
            exclude: Vec::new(),
            enabled: default_true(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_branch() -> String {
    "master".into()
}
fn default_docs_path() -> String {
    "docs/".into()
}
fn default_true() -> bool {
    true
}
fn default_cache_dir() -> String {
    ".cache/plugin/git-committers".into()
}

impl AppConfig {
    /// Base URL of the git host's web UI, always with a trailing slash.
    pub fn host_url(&self) -> Result<Url> {
        let raw = if self.enterprise_hostname.is_empty() {
            PUBLIC_HOST_URL.to_string()
        } else {
            format!("https://{}/", self.enterprise_hostname)
        };
        Url::parse(&raw).map_err(|e| {
            BylinesError::config(format!("invalid host '{}': {e}", self.enterprise_hostname))
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the config from `bylines.toml` under `root`. Returns defaults if
/// the file does not exist.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let path = root.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BylinesError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BylinesError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file under `root` and return its path.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = root.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| BylinesError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BylinesError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

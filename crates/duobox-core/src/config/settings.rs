//! Application configuration loaded from a TOML file.
//!
//! The default configuration matches the values shown in `config/default.toml`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::nav::filter::SortField;

/// Environment variable consulted before `[remote] access_token`.
pub const ACCESS_TOKEN_ENV: &str = "DROPBOX_ACCESS_TOKEN";

/// Top-level application configuration.
///
/// All fields have sensible defaults so duobox works without a config file.
/// Call [`Config::load`] to read from a TOML path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Window title and start paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_loading_message")]
    pub loading_message: String,
    #[serde(default = "default_root")]
    pub left_path: String,
    #[serde(default = "default_root")]
    pub right_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            loading_message: default_loading_message(),
            left_path: default_root(),
            right_path: default_root(),
        }
    }
}

/// Listing cache bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// How listings are sorted, filtered and paged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub descending: bool,
    #[serde(default = "default_true")]
    pub folders_first: bool,
    #[serde(default)]
    pub show_hidden: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub strip_suffix: String,
    #[serde(default = "default_prefetch_margin")]
    pub prefetch_margin: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sort: SortField::default(),
            descending: false,
            folders_first: true,
            show_hidden: false,
            exclude: Vec::new(),
            strip_suffix: String::new(),
            prefetch_margin: default_prefetch_margin(),
        }
    }
}

/// Dropbox connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// The access token, preferring the environment over the file.
    pub fn resolved_token(&self) -> String {
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.access_token.clone())
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("access_token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_title() -> String {
    "duobox".to_string()
}

fn default_loading_message() -> String {
    "Loading...".to_string()
}

fn default_root() -> String {
    "/".to_string()
}

fn default_capacity() -> usize {
    64
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_prefetch_margin() -> usize {
    10
}

fn default_page_size() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    30
}

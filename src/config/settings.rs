//! Application settings loaded from `hillside.toml`
//!
//! Every section is optional; anything omitted falls back to a local development
//! default so the crate can start against a fresh checkout.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "hillside.toml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "HILLSIDE_CONFIG";

/// Configuration structure representing the entire settings file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Document store connection
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Avatar bucket
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session persistence
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[database]` section
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SeaORM connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// `[storage]` section
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory the bucket writes files into
    #[serde(default = "default_bucket_dir")]
    pub bucket_dir: PathBuf,
    /// Public URL prefix that file ids are appended to
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Largest accepted upload in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Accepted upload content types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_dir: default_bucket_dir(),
            public_base_url: default_public_base_url(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

/// `[session]` section
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Where the current session token is persisted between runs
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/hillside.sqlite?mode=rwc".to_string()
}

fn default_bucket_dir() -> PathBuf {
    PathBuf::from("data/bucket")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/v1/storage/buckets/avatars".to_string()
}

const fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    ["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_token_file() -> PathBuf {
    PathBuf::from("data/session.token")
}

/// Parses settings from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads settings from `HILLSIDE_CONFIG` or `./hillside.toml`.
///
/// A missing file is not an error: the defaults are used instead. The
/// `DATABASE_URL` environment variable always wins over the file.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        tracing::info!("No settings file at {path}, using defaults");
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    Ok(config)
}
